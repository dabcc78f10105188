use image::GrayImage;

use crate::shared::frame::Frame;

const SHIFT: u32 = 14;
const R_WEIGHT: u32 = 4899; // 0.299 * 2^14
const G_WEIGHT: u32 = 9617; // 0.587 * 2^14
const B_WEIGHT: u32 = 1868; // 0.114 * 2^14

/// Converts a color frame to single-channel intensity.
///
/// Uses BT.601 luma weights in 14-bit fixed point with round-half-up,
/// honoring the frame's channel order.
pub fn to_intensity(frame: &Frame) -> GrayImage {
    let [ri, gi, bi] = frame.format().rgb_offsets();
    let luma: Vec<u8> = frame
        .data()
        .chunks_exact(3)
        .map(|px| {
            let y = px[ri] as u32 * R_WEIGHT
                + px[gi] as u32 * G_WEIGHT
                + px[bi] as u32 * B_WEIGHT
                + (1 << (SHIFT - 1));
            (y >> SHIFT) as u8
        })
        .collect();
    GrayImage::from_raw(frame.width(), frame.height(), luma)
        .expect("luma buffer has one byte per pixel")
}
