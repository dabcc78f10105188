use std::path::PathBuf;

/// Describes a frame source: an image file is a one-frame sequence, a
/// directory of images is one frame per file in name order.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceMetadata {
    pub total_frames: usize,
    /// File name of each frame, indexed by `Frame::index`.
    pub file_names: Vec<String>,
    pub source_path: Option<PathBuf>,
}

impl SequenceMetadata {
    pub fn file_name(&self, index: usize) -> Option<&str> {
        self.file_names.get(index).map(String::as_str)
    }
}
