use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color, independent of any frame's channel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn components(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A color with straight (non-premultiplied) alpha in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub color: Color,
    pub alpha: f32,
}

impl Rgba {
    pub const fn opaque(color: Color) -> Self {
        Self { color, alpha: 1.0 }
    }

    pub const fn translucent(color: Color, alpha: f32) -> Self {
        Self { color, alpha }
    }
}
