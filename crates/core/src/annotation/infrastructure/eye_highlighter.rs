use std::sync::Arc;

use image::imageops;
use image::GrayImage;

use crate::annotation::domain::frame_processor::FrameProcessor;
use crate::annotation::domain::highlight_style::HighlightStyle;
use crate::detection::domain::intensity::to_intensity;
use crate::detection::infrastructure::detector_set::DetectorSet;
use crate::shared::detection_box::DetectionBox;
use crate::shared::frame::Frame;

use super::compositing;

/// Finds eyes inside detected faces and paints a translucent box over each.
pub struct EyeHighlighter {
    detectors: Arc<DetectorSet>,
    style: HighlightStyle,
}

impl EyeHighlighter {
    pub fn new(detectors: Arc<DetectorSet>, style: HighlightStyle) -> Self {
        Self { detectors, style }
    }
}

impl FrameProcessor for EyeHighlighter {
    fn process(&self, frame: Frame) -> Frame {
        highlight_eyes(&self.detectors, &self.style, frame)
    }
}

/// Eye boxes in frame coordinates.
///
/// Each face is cropped from the intensity image and searched for eyes on
/// its own; a failing detector contributes no boxes.
pub fn locate_eyes(detectors: &DetectorSet, frame: &Frame) -> Vec<DetectionBox> {
    let gray = to_intensity(frame);
    let faces = detectors.face().detect(&gray).unwrap_or_else(|e| {
        log::warn!("Face detection failed on frame {}: {e}", frame.index());
        Vec::new()
    });

    let mut eyes = Vec::new();
    for face in faces {
        let Some(face) = face.clamp_to(gray.width(), gray.height()) else {
            continue;
        };
        let crop = crop(&gray, &face);
        match detectors.eye().detect(&crop) {
            Ok(found) => eyes.extend(found.into_iter().map(|e| e.translate(face.x, face.y))),
            Err(e) => log::warn!("Eye detection failed on frame {}: {e}", frame.index()),
        }
    }
    log::debug!("Frame {}: {} eyes", frame.index(), eyes.len());
    eyes
}

/// Runs detection on `frame` and paints every eye found.
///
/// Returns the input untouched when nothing is found.
pub fn highlight_eyes(detectors: &DetectorSet, style: &HighlightStyle, frame: Frame) -> Frame {
    let eyes = locate_eyes(detectors, &frame);
    paint_eyes(frame, &eyes, style)
}

/// Fills each box on an overlay copy, outlines it on the frame, then blends
/// the two with `style.overlay_weight`.
pub fn paint_eyes(mut frame: Frame, eyes: &[DetectionBox], style: &HighlightStyle) -> Frame {
    if eyes.is_empty() {
        return frame;
    }
    let format = frame.format();

    let mut overlay = frame.clone();
    {
        let mut view = overlay.as_ndarray_mut();
        for eye in eyes {
            compositing::fill_rect(&mut view, format, eye, style.fill);
        }
    }

    let mut view = frame.as_ndarray_mut();
    for eye in eyes {
        compositing::stroke_rect(
            &mut view,
            format,
            eye,
            style.outline,
            style.outline_thickness,
        );
    }
    compositing::add_weighted(&mut view, &overlay.as_ndarray(), style.overlay_weight);
    drop(view);

    frame
}

fn crop(gray: &GrayImage, region: &DetectionBox) -> GrayImage {
    imageops::crop_imm(
        gray,
        region.x as u32,
        region.y as u32,
        region.width as u32,
        region.height as u32,
    )
    .to_image()
}
