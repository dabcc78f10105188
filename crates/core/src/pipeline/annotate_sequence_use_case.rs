use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::annotation::domain::frame_processor::FrameProcessor;
use crate::pipeline::annotate_image_use_case::elapsed_ms;
use crate::pipeline::pipeline_executor::{PipelineConfig, PipelineExecutor, ProgressCallback};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::domain::frame_writer::FrameWriter;

/// Directory pipeline: every image in `input` is annotated into `output`
/// under the same file name.
pub struct AnnotateSequenceUseCase {
    reader: Box<dyn FrameReader>,
    writer: Box<dyn FrameWriter>,
    processor: Arc<dyn FrameProcessor>,
    executor: Box<dyn PipelineExecutor>,
    logger: Arc<Mutex<Box<dyn PipelineLogger>>>,
}

impl AnnotateSequenceUseCase {
    pub fn new(
        reader: Box<dyn FrameReader>,
        writer: Box<dyn FrameWriter>,
        processor: Arc<dyn FrameProcessor>,
        executor: Box<dyn PipelineExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            processor,
            executor,
            logger: Arc::new(Mutex::new(logger)),
        }
    }

    /// Runs the pipeline. `on_progress` sees `(done, total)` after each
    /// frame and may return `false` to stop early.
    pub fn execute(
        self,
        input_path: &Path,
        output_path: &Path,
        cancelled: Arc<AtomicBool>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Self {
            mut reader,
            writer,
            processor,
            executor,
            logger,
        } = self;

        let metadata = reader.open(input_path)?;
        let constraints = processor.constraints();
        if !constraints.video {
            return Err("Processor does not accept video frames".into());
        }
        log_info(&logger, &format!("Annotating {} images", metadata.total_frames));

        let progress_logger = logger.clone();
        let callback: ProgressCallback = Box::new(move |done, total| {
            if let Ok(mut l) = progress_logger.lock() {
                l.progress(done, total);
            }
            on_progress.as_ref().map_or(true, |cb| cb(done, total))
        });

        let started = Instant::now();
        let result = executor.execute(
            reader,
            writer,
            processor,
            &metadata,
            output_path,
            PipelineConfig {
                on_progress: Some(callback),
                cancelled,
            },
        );

        if let Ok(mut l) = logger.lock() {
            l.timing("sequence", elapsed_ms(started));
            l.summary();
        }
        result
    }
}

fn log_info(logger: &Mutex<Box<dyn PipelineLogger>>, message: &str) {
    if let Ok(mut l) = logger.lock() {
        l.info(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::Frame;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;
    use crate::video::infrastructure::image_sequence_reader::ImageSequenceReader;
    use crate::video::infrastructure::image_sequence_writer::ImageSequenceWriter;

    struct Blackout;

    impl FrameProcessor for Blackout {
        fn process(&self, mut frame: Frame) -> Frame {
            frame.data_mut().fill(0);
            frame
        }
    }

    fn write_inputs(dir: &Path, names: &[&str]) {
        for name in names {
            image::RgbImage::from_pixel(6, 4, image::Rgb([200, 100, 50]))
                .save(dir.join(name))
                .unwrap();
        }
    }

    fn use_case() -> AnnotateSequenceUseCase {
        AnnotateSequenceUseCase::new(
            Box::new(ImageSequenceReader::new()),
            Box::new(ImageSequenceWriter::new(Box::new(ImageFileWriter::new()))),
            Arc::new(Blackout),
            Box::new(ThreadedPipelineExecutor::new()),
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_every_image_is_annotated_under_its_name() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_inputs(input.path(), &["one.png", "two.png"]);

        use_case()
            .execute(
                input.path(),
                output.path(),
                Arc::new(AtomicBool::new(false)),
                None,
            )
            .unwrap();

        for name in ["one.png", "two.png"] {
            let img = image::open(output.path().join(name)).unwrap().to_rgb8();
            assert_eq!(img.dimensions(), (6, 4));
            assert_eq!(img.get_pixel(3, 2).0, [0, 0, 0]);
        }
    }

    #[test]
    fn test_progress_callback_receives_totals() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_inputs(input.path(), &["a.png", "b.png", "c.png"]);
        let last = Arc::new(Mutex::new((0, 0)));
        let last_cb = last.clone();

        use_case()
            .execute(
                input.path(),
                output.path(),
                Arc::new(AtomicBool::new(false)),
                Some(Box::new(move |done, total| {
                    *last_cb.lock().unwrap() = (done, total);
                    true
                })),
            )
            .unwrap();

        assert_eq!(*last.lock().unwrap(), (3, 3));
    }

    #[test]
    fn test_missing_input_directory_fails_before_writing() {
        let output = tempfile::tempdir().unwrap();
        let target = output.path().join("out");
        let result = use_case().execute(
            Path::new("/nonexistent/frames"),
            &target,
            Arc::new(AtomicBool::new(false)),
            None,
        );
        assert!(result.is_err());
        assert!(!target.exists());
    }
}
