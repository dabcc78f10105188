use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use eyepong_core::annotation::domain::highlight_style::HighlightStyle;
use eyepong_core::annotation::infrastructure::eye_highlighter::EyeHighlighter;
use eyepong_core::detection::domain::detection_params::DetectionParams;
use eyepong_core::detection::infrastructure::detector_set::DetectorSet;
use eyepong_core::pipeline::annotate_image_use_case::AnnotateImageUseCase;
use eyepong_core::pipeline::pipeline_logger::NullPipelineLogger;
use eyepong_core::video::infrastructure::image_file_reader::ImageFileReader;
use eyepong_core::video::infrastructure::image_file_writer::ImageFileWriter;

use super::cascade_cache::CascadeCache;

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    DownloadProgress(u64, u64),
    Annotating,
    Complete(PathBuf),
    Error(String),
    Cancelled,
}

pub struct AnnotateParams {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub face_params: DetectionParams,
    pub eye_params: DetectionParams,
    pub style: HighlightStyle,
    pub cascade_cache: Arc<CascadeCache>,
}

/// Spawn a background annotation. Returns the channel receiver and
/// cancellation token.
pub fn spawn(params: AnnotateParams) -> (Receiver<WorkerMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        if let Err(e) = run_annotate(&tx, &cancelled_clone, &params) {
            if cancelled_clone.load(Ordering::Relaxed) {
                let _ = tx.send(WorkerMessage::Cancelled);
            } else {
                log::error!("Annotation failed: {e}");
                let _ = tx.send(WorkerMessage::Error(e.to_string()));
            }
        }
    });

    (rx, cancelled)
}

fn run_annotate(
    tx: &Sender<WorkerMessage>,
    cancelled: &AtomicBool,
    params: &AnnotateParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let tx_dl = tx.clone();
    let (face_path, eye_path) = params.cascade_cache.wait_for_cascades(
        &|downloaded, total| {
            let _ = tx_dl.send(WorkerMessage::DownloadProgress(downloaded, total));
        },
        cancelled,
    )?;
    if cancelled.load(Ordering::Relaxed) {
        return Err("Cancelled".into());
    }

    let _ = tx.send(WorkerMessage::Annotating);
    let detectors = DetectorSet::load(&face_path, &eye_path, params.face_params, params.eye_params)?;
    let highlighter = EyeHighlighter::new(Arc::new(detectors), params.style);

    let mut use_case = AnnotateImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        Arc::new(highlighter),
        Box::new(NullPipelineLogger),
    );
    use_case.execute(&params.input_path, &params.output_path)?;

    if cancelled.load(Ordering::Relaxed) {
        return Err("Cancelled".into());
    }

    let _ = tx.send(WorkerMessage::Complete(params.output_path.clone()));
    Ok(())
}
