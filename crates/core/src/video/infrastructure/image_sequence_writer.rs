use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::video::domain::frame_writer::FrameWriter;
use crate::video::domain::image_writer::ImageWriter;

/// Writes each frame of a sequence into a directory under its source file
/// name.
pub struct ImageSequenceWriter {
    image_writer: Box<dyn ImageWriter>,
    output_dir: Option<PathBuf>,
    file_names: Vec<String>,
    written: usize,
}

impl ImageSequenceWriter {
    pub fn new(image_writer: Box<dyn ImageWriter>) -> Self {
        Self {
            image_writer,
            output_dir: None,
            file_names: Vec::new(),
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameWriter for ImageSequenceWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &SequenceMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(path)?;
        self.output_dir = Some(path.to_path_buf());
        self.file_names = metadata.file_names.clone();
        self.written = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let dir = self
            .output_dir
            .as_ref()
            .ok_or("ImageSequenceWriter: not opened")?;
        let name = self
            .file_names
            .get(frame.index())
            .ok_or_else(|| format!("No file name for frame {}", frame.index()))?;
        self.image_writer.write(&dir.join(name), frame)?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = self.output_dir.take() {
            log::debug!("Wrote {} images to {}", self.written, dir.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::PixelFormat;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;

    fn metadata(names: &[&str]) -> SequenceMetadata {
        SequenceMetadata {
            total_frames: names.len(),
            file_names: names.iter().map(|n| n.to_string()).collect(),
            source_path: None,
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![9u8; 4 * 4 * 3], 4, 4, PixelFormat::Rgb24, index)
    }

    #[test]
    fn test_frames_land_under_their_source_names() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut writer = ImageSequenceWriter::new(Box::new(ImageFileWriter::new()));
        writer.open(&out, &metadata(&["a.png", "b.png"])).unwrap();
        writer.write(&frame(1)).unwrap();
        writer.write(&frame(0)).unwrap();
        writer.close().unwrap();

        assert!(out.join("a.png").exists());
        assert!(out.join("b.png").exists());
        assert_eq!(writer.written(), 2);
    }

    #[test]
    fn test_write_before_open_fails() {
        let mut writer = ImageSequenceWriter::new(Box::new(ImageFileWriter::new()));
        assert!(writer.write(&frame(0)).is_err());
    }

    #[test]
    fn test_unknown_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImageSequenceWriter::new(Box::new(ImageFileWriter::new()));
        writer.open(dir.path(), &metadata(&["a.png"])).unwrap();
        assert!(writer.write(&frame(3)).is_err());
    }
}
