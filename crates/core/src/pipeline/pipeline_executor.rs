use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::annotation::domain::frame_processor::FrameProcessor;
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::domain::frame_writer::FrameWriter;

/// Progress callback: `(frames_done, total_frames)`. Returning `false`
/// cancels the run.
pub type ProgressCallback = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Configuration for one sequence run.
pub struct PipelineConfig {
    pub on_progress: Option<ProgressCallback>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Abstracts how the read → annotate → write pipeline is executed.
///
/// Application-layer port; infrastructure provides the concrete runners.
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        reader: Box<dyn FrameReader>,
        writer: Box<dyn FrameWriter>,
        processor: Arc<dyn FrameProcessor>,
        metadata: &SequenceMetadata,
        output_path: &Path,
        config: PipelineConfig,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
