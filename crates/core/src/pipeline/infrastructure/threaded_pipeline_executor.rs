use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::annotation::domain::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_executor::{PipelineConfig, PipelineExecutor};
use crate::shared::frame::Frame;
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::domain::frame_writer::FrameWriter;

const DEFAULT_CHANNEL_CAPACITY: usize = 4;

type SendError = Box<dyn std::error::Error + Send + Sync>;
type FrameMessage = Result<Frame, SendError>;

/// Runs the annotation pipeline on dedicated threads.
///
/// Layout: `reader → annotate → main [progress/cancel] → writer`, joined by
/// bounded channels so decoding, annotation and encoding overlap while at
/// most a few frames are in flight.
pub struct ThreadedPipelineExecutor {
    channel_capacity: usize,
}

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        reader: Box<dyn FrameReader>,
        mut writer: Box<dyn FrameWriter>,
        processor: Arc<dyn FrameProcessor>,
        metadata: &SequenceMetadata,
        output_path: &Path,
        config: PipelineConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let cap = self.channel_capacity;
        writer.open(output_path, metadata)?;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<FrameMessage>(cap);
        let (annotated_tx, annotated_rx) = crossbeam_channel::bounded::<FrameMessage>(cap);
        let (write_tx, write_rx) = crossbeam_channel::bounded::<Frame>(cap);

        let reader_handle = spawn_reader(reader, frame_tx, config.cancelled.clone());
        let annotate_handle =
            spawn_annotator(processor, frame_rx, annotated_tx, config.cancelled.clone());
        let writer_handle = spawn_writer(writer, write_rx);

        let main_error = run_main_loop(annotated_rx, &write_tx, metadata.total_frames, &config);
        drop(write_tx);

        join_threads(reader_handle, annotate_handle, writer_handle, main_error)
    }
}

fn spawn_reader(
    mut reader: Box<dyn FrameReader>,
    frame_tx: Sender<FrameMessage>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<Box<dyn FrameReader>> {
    std::thread::spawn(move || {
        for frame_result in reader.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            if frame_tx.send(mapped).is_err() {
                break;
            }
        }
        reader.close();
        reader
    })
}

fn spawn_annotator(
    processor: Arc<dyn FrameProcessor>,
    frame_rx: Receiver<FrameMessage>,
    annotated_tx: Sender<FrameMessage>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for frame_result in frame_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let result = frame_result.map(|frame| processor.process(frame));
            if annotated_tx.send(result).is_err() {
                break;
            }
        }
    })
}

fn spawn_writer(
    mut writer: Box<dyn FrameWriter>,
    write_rx: Receiver<Frame>,
) -> JoinHandle<Result<Box<dyn FrameWriter>, SendError>> {
    std::thread::spawn(move || {
        for frame in write_rx {
            writer
                .write(&frame)
                .map_err(|e| -> SendError { e.to_string().into() })?;
        }
        Ok(writer)
    })
}

/// Forwards annotated frames to the writer, reporting progress and
/// honoring cancellation. Returns the first error, if any.
fn run_main_loop(
    annotated_rx: Receiver<FrameMessage>,
    write_tx: &Sender<Frame>,
    total_frames: usize,
    config: &PipelineConfig,
) -> Option<Box<dyn std::error::Error>> {
    let mut done = 0usize;
    for annotated in annotated_rx {
        if config.cancelled.load(Ordering::Relaxed) {
            return Some("Cancelled".into());
        }
        let frame = match annotated {
            Ok(frame) => frame,
            Err(e) => return Some(e.to_string().into()),
        };
        if write_tx.send(frame).is_err() {
            return Some("Writer channel closed unexpectedly".into());
        }

        done += 1;
        if let Some(ref callback) = config.on_progress {
            if !callback(done, total_frames) {
                config.cancelled.store(true, Ordering::Relaxed);
                return Some("Cancelled".into());
            }
        }
    }
    None
}

/// Joins all pipeline threads and keeps the first error encountered.
fn join_threads(
    reader_handle: JoinHandle<Box<dyn FrameReader>>,
    annotate_handle: JoinHandle<()>,
    writer_handle: JoinHandle<Result<Box<dyn FrameWriter>, SendError>>,
    mut first_error: Option<Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    fn set_if_none(slot: &mut Option<Box<dyn std::error::Error>>, err: Box<dyn std::error::Error>) {
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    if reader_handle.join().is_err() {
        set_if_none(&mut first_error, "Reader thread panicked".into());
    }
    if annotate_handle.join().is_err() {
        set_if_none(&mut first_error, "Annotate thread panicked".into());
    }
    match writer_handle.join() {
        Ok(Ok(mut w)) => {
            if let Err(e) = w.close() {
                set_if_none(&mut first_error, e);
            }
        }
        Ok(Err(e)) => set_if_none(&mut first_error, e.to_string().into()),
        Err(_) => set_if_none(&mut first_error, "Writer thread panicked".into()),
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
