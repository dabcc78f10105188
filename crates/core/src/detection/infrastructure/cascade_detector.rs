use std::borrow::Cow;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::object_detector::{DetectError, ObjectDetector};
use crate::shared::constants::GROUP_EPS;
use crate::shared::detection_box::DetectionBox;

use super::haar_cascade::HaarCascade;
use super::integral_image::IntegralImage;
use super::rect_grouper::group_rectangles;

/// Outcome of running the cascade on one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowVerdict {
    Accepted,
    Rejected { stage: usize },
}

/// Multi-scale sliding-window detector over a [`HaarCascade`].
///
/// The image is shrunk by `scale_factor` per level while the cascade window
/// stays fixed; hits are mapped back to source coordinates and merged by
/// [`group_rectangles`].
pub struct CascadeDetector {
    cascade: Arc<HaarCascade>,
    params: DetectionParams,
}

impl CascadeDetector {
    pub fn new(cascade: Arc<HaarCascade>, params: DetectionParams) -> Self {
        Self { cascade, params }
    }

    /// Every accepted window across all scales, before grouping. Callers
    /// validate the params first; a scale factor of 1 or less never ends.
    fn detect_raw(&self, image: &GrayImage) -> Vec<DetectionBox> {
        let (win_w, win_h) = self.cascade.window_size();
        let (img_w, img_h) = image.dimensions();
        let (min_w, min_h) = self.params.min_size.unwrap_or((0, 0));
        let (max_w, max_h) = self.params.max_size.unwrap_or((img_w, img_h));

        let mut hits = Vec::new();
        let mut factor = 1.0f64;
        loop {
            let window_w = (win_w as f64 * factor).round() as u32;
            let window_h = (win_h as f64 * factor).round() as u32;
            let scaled_w = (img_w as f64 / factor).round() as u32;
            let scaled_h = (img_h as f64 / factor).round() as u32;

            if scaled_w <= win_w || scaled_h <= win_h {
                break;
            }
            if window_w > max_w || window_h > max_h {
                break;
            }
            if window_w >= min_w && window_h >= min_h {
                let scaled = if scaled_w == img_w && scaled_h == img_h {
                    Cow::Borrowed(image)
                } else {
                    Cow::Owned(imageops::resize(image, scaled_w, scaled_h, FilterType::Triangle))
                };
                let before = hits.len();
                self.scan_level(&scaled, factor, (window_w, window_h), &mut hits);
                log::trace!(
                    "scale {factor:.3}: {}x{} image, {} hits",
                    scaled_w,
                    scaled_h,
                    hits.len() - before
                );
            }

            factor *= self.params.scale_factor;
        }
        hits
    }

    fn scan_level(
        &self,
        scaled: &GrayImage,
        factor: f64,
        window: (u32, u32),
        hits: &mut Vec<DetectionBox>,
    ) {
        let (win_w, win_h) = self.cascade.window_size();
        let ii = IntegralImage::new(scaled);
        let end_x = ii.width() - win_w;
        let end_y = ii.height() - win_h;
        let step = if factor > 2.0 { 1 } else { 2 };

        let mut y = 0;
        while y < end_y {
            let mut x = 0;
            while x < end_x {
                match self.classify(&ii, x, y) {
                    WindowVerdict::Accepted => hits.push(DetectionBox::new(
                        (x as f64 * factor).round() as i32,
                        (y as f64 * factor).round() as i32,
                        window.0 as i32,
                        window.1 as i32,
                    )),
                    // Early rejection also skips the neighbouring window
                    WindowVerdict::Rejected { stage: 0 } => x += step,
                    WindowVerdict::Rejected { .. } => {}
                }
                x += step;
            }
            y += step;
        }
    }

    /// Runs every stage on the window whose top-left corner is `(x, y)`.
    pub fn classify(&self, ii: &IntegralImage, x: u32, y: u32) -> WindowVerdict {
        let (win_w, win_h) = self.cascade.window_size();

        // Variance normalization over the window shrunk by one pixel per side
        let (nx, ny, nw, nh) = (x + 1, y + 1, win_w - 2, win_h - 2);
        let area = (nw * nh) as f64;
        let sum = ii.rect_sum(nx, ny, nw, nh) as f64;
        let sq_sum = ii.rect_sq_sum(nx, ny, nw, nh) as f64;
        let variance = area * sq_sum - sum * sum;
        let nf = if variance > 0.0 {
            variance.sqrt() as f32
        } else {
            1.0
        };

        let features = self.cascade.features();
        let feature_value = |index: usize| {
            let raw: f32 = features[index]
                .rects
                .iter()
                .map(|r| r.weight * ii.rect_sum(x + r.x, y + r.y, r.width, r.height) as f32)
                .sum();
            raw / nf
        };

        for (stage_index, stage) in self.cascade.stages().iter().enumerate() {
            let score: f32 = stage
                .classifiers
                .iter()
                .map(|weak| weak.evaluate(&feature_value))
                .sum();
            if score < stage.threshold {
                return WindowVerdict::Rejected { stage: stage_index };
            }
        }
        WindowVerdict::Accepted
    }
}

impl ObjectDetector for CascadeDetector {
    fn detect(&self, image: &GrayImage) -> Result<Vec<DetectionBox>, DetectError> {
        self.params.validate()?;
        let raw = self.detect_raw(image);
        let grouped = group_rectangles(&raw, self.params.min_neighbors, GROUP_EPS);
        log::debug!(
            "{}x{}: {} raw hits grouped into {} detections",
            image.width(),
            image.height(),
            raw.len(),
            grouped.len()
        );
        Ok(grouped)
    }
}
