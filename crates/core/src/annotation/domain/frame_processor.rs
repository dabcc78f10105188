use crate::shared::frame::Frame;

use super::stream_constraints::StreamConstraints;

/// Per-frame transform invoked by a media host.
///
/// The host hands over one frame and takes back one frame with the same
/// dimensions and pixel format. Implementations must not fail: anything
/// that goes wrong inside degrades to returning the input unchanged.
pub trait FrameProcessor: Send + Sync {
    fn process(&self, frame: Frame) -> Frame;

    /// Channels the host should capture for this processor.
    fn constraints(&self) -> StreamConstraints {
        StreamConstraints::default()
    }
}
