use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::annotation::domain::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::domain::image_writer::ImageWriter;

/// Single-image pipeline: read → annotate → write.
pub struct AnnotateImageUseCase {
    reader: Box<dyn FrameReader>,
    image_writer: Box<dyn ImageWriter>,
    processor: Arc<dyn FrameProcessor>,
    logger: Box<dyn PipelineLogger>,
}

impl AnnotateImageUseCase {
    pub fn new(
        reader: Box<dyn FrameReader>,
        image_writer: Box<dyn ImageWriter>,
        processor: Arc<dyn FrameProcessor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            processor,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !self.processor.constraints().video {
            return Err("Processor does not accept video frames".into());
        }

        let started = Instant::now();
        self.reader.open(input_path)?;
        let frame = self.reader.frames().next().ok_or("No frames in image")??;
        self.reader.close();
        self.logger.timing("read", elapsed_ms(started));

        let started = Instant::now();
        let annotated = self.processor.process(frame);
        self.logger.timing("annotate", elapsed_ms(started));

        let started = Instant::now();
        self.image_writer.write(output_path, &annotated)?;
        self.logger.timing("write", elapsed_ms(started));

        self.logger.progress(1, 1);
        self.logger
            .info(&format!("Wrote {}", output_path.display()));
        self.logger.summary();
        Ok(())
    }
}

pub(crate) fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::stream_constraints::StreamConstraints;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::{Frame, PixelFormat};
    use crate::shared::sequence_metadata::SequenceMetadata;
    use crate::video::domain::frame_reader::FrameResult;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct StubImageReader {
        frame: Option<Frame>,
    }

    impl FrameReader for StubImageReader {
        fn open(&mut self, _path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>> {
            Ok(SequenceMetadata {
                total_frames: 1,
                file_names: vec!["in.png".to_string()],
                source_path: None,
            })
        }

        fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_> {
            Box::new(self.frame.take().into_iter().map(Ok))
        }

        fn close(&mut self) {}
    }

    struct StubImageWriter {
        written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    struct MarkFirstByte;

    impl FrameProcessor for MarkFirstByte {
        fn process(&self, mut frame: Frame) -> Frame {
            frame.data_mut()[0] = 1;
            frame
        }
    }

    fn use_case(
        frame: Option<Frame>,
    ) -> (AnnotateImageUseCase, Arc<Mutex<Vec<(PathBuf, Frame)>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let uc = AnnotateImageUseCase::new(
            Box::new(StubImageReader { frame }),
            Box::new(StubImageWriter {
                written: written.clone(),
            }),
            Arc::new(MarkFirstByte),
            Box::new(NullPipelineLogger),
        );
        (uc, written)
    }

    #[test]
    fn test_writes_processed_frame_to_output() {
        let frame = Frame::new(vec![9; 6 * 4 * 3], 6, 4, PixelFormat::Rgb24, 0);
        let (mut uc, written) = use_case(Some(frame));

        uc.execute(Path::new("in.png"), Path::new("out.png")).unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("out.png"));
        assert_eq!(written[0].1.data()[0], 1);
        assert_eq!((written[0].1.width(), written[0].1.height()), (6, 4));
    }

    struct AudioOnly;

    impl FrameProcessor for AudioOnly {
        fn process(&self, frame: Frame) -> Frame {
            frame
        }

        fn constraints(&self) -> StreamConstraints {
            StreamConstraints {
                video: false,
                audio: true,
            }
        }
    }

    #[test]
    fn test_processor_without_video_is_rejected() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let frame = Frame::new(vec![9; 2 * 2 * 3], 2, 2, PixelFormat::Rgb24, 0);
        let mut uc = AnnotateImageUseCase::new(
            Box::new(StubImageReader { frame: Some(frame) }),
            Box::new(StubImageWriter {
                written: written.clone(),
            }),
            Arc::new(AudioOnly),
            Box::new(NullPipelineLogger),
        );

        assert!(uc.execute(Path::new("in.png"), Path::new("out.png")).is_err());
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let (mut uc, written) = use_case(None);
        assert!(uc.execute(Path::new("in.png"), Path::new("out.png")).is_err());
        assert!(written.lock().unwrap().is_empty());
    }
}
