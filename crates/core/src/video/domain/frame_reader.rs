use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::sequence_metadata::SequenceMetadata;

pub type FrameResult = Result<Frame, Box<dyn std::error::Error>>;

/// Reads frames from an image file or a sequence of image files.
///
/// Decoding details stay behind this trait; the pipeline only sees
/// [`Frame`] and [`SequenceMetadata`].
pub trait FrameReader: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in sequence order.
    fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
