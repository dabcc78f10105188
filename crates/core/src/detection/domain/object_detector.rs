use image::GrayImage;

use crate::shared::detection_box::DetectionBox;

pub type DetectError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for locating objects in a single-channel image.
///
/// Detectors hold read-only models, hence `&self` and `Sync`: one
/// instance is shared by every frame, and by every thread if the host
/// overlaps frames. Boxes are in the coordinates of `image`.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &GrayImage) -> Result<Vec<DetectionBox>, DetectError>;
}
