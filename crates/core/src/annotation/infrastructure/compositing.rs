//! In-place drawing and blending on packed 3-channel frame views.
//!
//! Views are `(height, width, channels)` as produced by
//! [`Frame::as_ndarray_mut`](crate::shared::frame::Frame::as_ndarray_mut).
//! Colors are always given in RGB and placed according to the frame's
//! [`PixelFormat`].

use ndarray::{s, ArrayView3, ArrayViewMut3, Axis, Zip};

use crate::shared::color::Color;
use crate::shared::detection_box::DetectionBox;
use crate::shared::frame::PixelFormat;

/// Fills the pixels from `(x, y)` to `(x + width, y + height)` inclusive,
/// clipped to the view.
pub fn fill_rect(
    view: &mut ArrayViewMut3<'_, u8>,
    format: PixelFormat,
    rect: &DetectionBox,
    color: Color,
) {
    fill_span(
        view,
        format,
        (rect.x as i64, rect.y as i64),
        (rect.right() as i64, rect.bottom() as i64),
        color,
    );
}

/// Strokes the border of `rect` (inclusive corners) with a band
/// `thickness` pixels wide, centered on each edge.
pub fn stroke_rect(
    view: &mut ArrayViewMut3<'_, u8>,
    format: PixelFormat,
    rect: &DetectionBox,
    color: Color,
    thickness: u32,
) {
    if thickness == 0 {
        return;
    }
    let outer = thickness as i64 / 2;
    let inner = (thickness as i64 - 1) / 2;
    let (x1, y1) = (rect.x as i64, rect.y as i64);
    let (x2, y2) = (rect.right() as i64, rect.bottom() as i64);

    // top, bottom, left, right
    fill_span(view, format, (x1 - outer, y1 - outer), (x2 + outer, y1 + inner), color);
    fill_span(view, format, (x1 - outer, y2 - inner), (x2 + outer, y2 + outer), color);
    fill_span(view, format, (x1 - outer, y1 - outer), (x1 + inner, y2 + outer), color);
    fill_span(view, format, (x2 - inner, y1 - outer), (x2 + outer, y2 + outer), color);
}

/// `dst = round(overlay * weight + dst * (1 - weight))`, saturated.
pub fn add_weighted(dst: &mut ArrayViewMut3<'_, u8>, overlay: &ArrayView3<'_, u8>, weight: f32) {
    let beta = 1.0 - weight;
    Zip::from(dst).and(overlay).for_each(|d, &o| {
        let v = weight * o as f32 + beta * *d as f32;
        *d = v.round().clamp(0.0, 255.0) as u8;
    });
}

fn fill_span(
    view: &mut ArrayViewMut3<'_, u8>,
    format: PixelFormat,
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
    color: Color,
) {
    let (h, w) = (view.len_of(Axis(0)) as i64, view.len_of(Axis(1)) as i64);
    let (x0, y0) = (x0.max(0), y0.max(0));
    let (x1, y1) = (x1.min(w - 1), y1.min(h - 1));
    if x0 > x1 || y0 > y1 {
        return;
    }

    let offsets = format.rgb_offsets();
    let rgb = color.components();
    let mut region = view.slice_mut(s![y0 as usize..=y1 as usize, x0 as usize..=x1 as usize, ..]);
    for mut px in region.lanes_mut(Axis(2)) {
        for (offset, value) in offsets.iter().zip(rgb) {
            px[*offset] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;

    const GREEN: Color = Color::rgb(0, 255, 0);

    fn blank(w: u32, h: u32, format: PixelFormat) -> Frame {
        Frame::new(vec![0u8; (w * h * 3) as usize], w, h, format, 0)
    }

    fn painted(frame: &Frame) -> Vec<(usize, usize)> {
        let view = frame.as_ndarray();
        let mut out = Vec::new();
        for y in 0..frame.height() as usize {
            for x in 0..frame.width() as usize {
                if view[[y, x, 1]] != 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_fill_includes_far_corner() {
        let mut frame = blank(10, 10, PixelFormat::Rgb24);
        fill_rect(
            &mut frame.as_ndarray_mut(),
            PixelFormat::Rgb24,
            &DetectionBox::new(2, 3, 2, 1),
            GREEN,
        );
        assert_eq!(
            painted(&frame),
            vec![(2, 3), (3, 3), (4, 3), (2, 4), (3, 4), (4, 4)]
        );
    }

    #[test]
    fn test_fill_honors_channel_order() {
        let mut frame = blank(2, 1, PixelFormat::Bgr24);
        fill_rect(
            &mut frame.as_ndarray_mut(),
            PixelFormat::Bgr24,
            &DetectionBox::new(0, 0, 0, 0),
            Color::rgb(10, 20, 30),
        );
        assert_eq!(frame.data(), &[30, 20, 10, 0, 0, 0]);
    }

    #[test]
    fn test_fill_clips_to_frame() {
        let mut frame = blank(4, 4, PixelFormat::Rgb24);
        fill_rect(
            &mut frame.as_ndarray_mut(),
            PixelFormat::Rgb24,
            &DetectionBox::new(-3, 2, 10, 10),
            GREEN,
        );
        assert_eq!(painted(&frame).len(), 8);
    }

    #[test]
    fn test_fill_fully_outside_is_noop() {
        let mut frame = blank(4, 4, PixelFormat::Rgb24);
        fill_rect(
            &mut frame.as_ndarray_mut(),
            PixelFormat::Rgb24,
            &DetectionBox::new(10, 10, 3, 3),
            GREEN,
        );
        assert!(painted(&frame).is_empty());
    }

    #[test]
    fn test_stroke_leaves_interior_untouched() {
        let mut frame = blank(20, 20, PixelFormat::Rgb24);
        let rect = DetectionBox::new(5, 5, 8, 8);
        stroke_rect(&mut frame.as_ndarray_mut(), PixelFormat::Rgb24, &rect, GREEN, 2);
        let view = frame.as_ndarray();
        // band spans one pixel outside to the edge itself on top/left
        assert_eq!(view[[4, 8, 1]], 255);
        assert_eq!(view[[5, 8, 1]], 255);
        assert_eq!(view[[6, 8, 1]], 0);
        // and the edge to one pixel outside on bottom/right
        assert_eq!(view[[13, 8, 1]], 255);
        assert_eq!(view[[14, 8, 1]], 255);
        assert_eq!(view[[12, 8, 1]], 0);
        assert_eq!(view[[9, 9, 1]], 0);
    }

    #[test]
    fn test_thin_stroke_is_exactly_the_edge() {
        let mut frame = blank(10, 10, PixelFormat::Rgb24);
        let rect = DetectionBox::new(2, 2, 3, 3);
        stroke_rect(&mut frame.as_ndarray_mut(), PixelFormat::Rgb24, &rect, GREEN, 1);
        // 4x4 inclusive square minus its 2x2 interior
        assert_eq!(painted(&frame).len(), 12);
    }

    #[test]
    fn test_add_weighted_rounds() {
        let mut dst = Frame::new(vec![100, 100, 100], 1, 1, PixelFormat::Rgb24, 0);
        let overlay = Frame::new(vec![0, 255, 0], 1, 1, PixelFormat::Rgb24, 0);
        add_weighted(&mut dst.as_ndarray_mut(), &overlay.as_ndarray(), 0.35);
        // 0.65 * 100 = 65; 0.35 * 255 + 65 = 154.25
        assert_eq!(dst.data(), &[65, 154, 65]);
    }

    #[test]
    fn test_add_weighted_identical_inputs_is_identity() {
        let data: Vec<u8> = (0..=255).cycle().take(4 * 4 * 3).collect();
        let mut dst = Frame::new(data.clone(), 4, 4, PixelFormat::Bgr24, 0);
        let overlay = dst.clone();
        add_weighted(&mut dst.as_ndarray_mut(), &overlay.as_ndarray(), 0.35);
        assert_eq!(dst.data(), &data[..]);
    }
}
