use std::path::Path;

use crate::shared::frame::{Frame, PixelFormat};
use crate::video::domain::image_writer::ImageWriter;

/// Encodes a frame with the `image` crate; the format follows the file
/// extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let rgb = frame.clone().into_format(PixelFormat::Rgb24);
        let img = image::RgbImage::from_raw(rgb.width(), rgb.height(), rgb.into_data())
            .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 3], format: PixelFormat) -> Frame {
        let data = px.repeat((width * height) as usize);
        Frame::new(data, width, height, format, 0)
    }

    #[test]
    fn test_write_creates_parent_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        ImageFileWriter::new()
            .write(&path, &solid(20, 10, [1, 2, 3], PixelFormat::Rgb24))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_bgr_frame_is_saved_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &solid(4, 4, [200, 100, 50], PixelFormat::Bgr24))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        assert!(ImageFileWriter::new()
            .write(&path, &solid(2, 2, [0, 0, 0], PixelFormat::Rgb24))
            .is_err());
    }
}
