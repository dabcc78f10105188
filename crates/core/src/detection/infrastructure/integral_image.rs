use image::GrayImage;

/// Summed-area tables of a grayscale image and of its squared values.
///
/// Both tables are `(width + 1) x (height + 1)` with a zero first row and
/// column, so any rectangle sum costs four lookups.
pub struct IntegralImage {
    stride: usize,
    width: u32,
    height: u32,
    sum: Vec<i64>,
    sq_sum: Vec<i64>,
}

impl IntegralImage {
    pub fn new(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let stride = width as usize + 1;
        let len = stride * (height as usize + 1);
        let mut sum = vec![0i64; len];
        let mut sq_sum = vec![0i64; len];

        for (y, row) in image.as_raw().chunks_exact(width.max(1) as usize).enumerate() {
            let mut row_sum = 0i64;
            let mut row_sq = 0i64;
            let above = y * stride;
            let here = (y + 1) * stride;
            for (x, &v) in row.iter().enumerate() {
                let v = v as i64;
                row_sum += v;
                row_sq += v * v;
                sum[here + x + 1] = sum[above + x + 1] + row_sum;
                sq_sum[here + x + 1] = sq_sum[above + x + 1] + row_sq;
            }
        }

        Self {
            stride,
            width,
            height,
            sum,
            sq_sum,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sum of pixels in `[x, x + w) x [y, y + h)`. The rectangle must lie
    /// inside the image.
    #[inline]
    pub fn rect_sum(&self, x: u32, y: u32, w: u32, h: u32) -> i64 {
        Self::lookup(&self.sum, self.stride, x, y, w, h)
    }

    /// Sum of squared pixels in `[x, x + w) x [y, y + h)`.
    #[inline]
    pub fn rect_sq_sum(&self, x: u32, y: u32, w: u32, h: u32) -> i64 {
        Self::lookup(&self.sq_sum, self.stride, x, y, w, h)
    }

    #[inline]
    fn lookup(table: &[i64], stride: usize, x: u32, y: u32, w: u32, h: u32) -> i64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        table[y1 * stride + x1] - table[y0 * stride + x1] - table[y1 * stride + x0]
            + table[y0 * stride + x0]
    }
}
