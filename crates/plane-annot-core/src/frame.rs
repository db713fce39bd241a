//! Row-major 8-bit grayscale frame buffers.

/// Borrowed view of a grayscale frame, `data.len() == width * height`.
#[derive(Clone, Copy, Debug)]
pub struct GrayFrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Owned grayscale frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayFrame {
    /// Allocate a zero-filled frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayFrameView<'_> {
        GrayFrameView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

#[inline]
fn pixel_or_zero(src: &GrayFrameView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

/// Bilinear sample at fractional coordinates. Pixels outside the frame read
/// as black.
#[inline]
pub fn sample_bilinear(src: &GrayFrameView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = pixel_or_zero(src, x0, y0) as f32;
    let p10 = pixel_or_zero(src, x0 + 1, y0) as f32;
    let p01 = pixel_or_zero(src, x0, y0 + 1) as f32;
    let p11 = pixel_or_zero(src, x0 + 1, y0 + 1) as f32;

    let top = p00 + fx * (p10 - p00);
    let bot = p01 + fx * (p11 - p01);
    top + fy * (bot - top)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayFrameView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}
