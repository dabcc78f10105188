use ndarray::{ArrayView3, ArrayViewMut3};

/// Channel order of a packed 8-bit, 3-channel pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Bgr24,
    Rgb24,
}

impl PixelFormat {
    pub const fn channels(self) -> u8 {
        3
    }

    /// Byte offsets of the red, green and blue channels inside one pixel.
    pub const fn rgb_offsets(self) -> [usize; 3] {
        match self {
            PixelFormat::Bgr24 => [2, 1, 0],
            PixelFormat::Rgb24 => [0, 1, 2],
        }
    }
}

/// A single video frame: packed 3-channel bytes in row-major order,
/// tagged with its channel order.
///
/// Frames arrive from an external media source and go back to it; the
/// annotator mutates pixels but never the dimensions or format.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (format.channels() as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            format,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Re-packs the pixels in `format`, swapping red and blue if needed.
    pub fn into_format(mut self, format: PixelFormat) -> Self {
        if self.format != format {
            for px in self.data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            self.format = format;
        }
        self
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels() as usize,
        )
    }
}
