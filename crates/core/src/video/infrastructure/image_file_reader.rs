use std::path::Path;

use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::video::domain::frame_reader::{FrameReader, FrameResult};

/// Adapts a single image file to the [`FrameReader`] interface as a
/// one-frame sequence.
pub struct ImageFileReader {
    frame: Option<Frame>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self { frame: None }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes any format the `image` crate understands into an RGB frame.
pub(crate) fn decode_frame(path: &Path, index: usize) -> FrameResult {
    let img = image::open(path)
        .map_err(|e| format!("Failed to decode {}: {e}", path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(
        img.into_raw(),
        width,
        height,
        PixelFormat::Rgb24,
        index,
    ))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl FrameReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>> {
        self.frame = Some(decode_frame(path, 0)?);
        Ok(SequenceMetadata {
            total_frames: 1,
            file_names: vec![file_name(path)],
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_> {
        if self.frame.is_none() {
            return Box::new(std::iter::once(Err("ImageFileReader: not opened".into())));
        }
        Box::new(self.frame.take().into_iter().map(Ok))
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
