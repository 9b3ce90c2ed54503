//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Used as phase symmetry input and output, and as the 2-D view of a
//! [`SampleBuffer`](crate::buffer::SampleBuffer).
use super::traits::ImageView;
use super::u8::ImageU8;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Fill a `w × h` image from `f(x, y)`.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// Copy an 8-bit view, mapping `0..=255` to `0.0..=1.0`.
    pub fn from_u8(src: &ImageU8<'_>) -> Self {
        Self::from_fn(src.w, src.h, |x, y| src.get(x, y) as f32 / 255.0)
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Smallest and largest finite pixel, `None` if there is none.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[f32]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_normalizes_and_respects_stride() {
        let raw = [0u8, 255, 9, 51, 102, 9];
        let view = ImageU8 {
            w: 2,
            h: 2,
            stride: 3,
            data: &raw,
        };
        let img = ImageF32::from_u8(&view);
        assert_eq!(img.data, vec![0.0, 1.0, 0.2, 0.4]);
        assert_eq!(img.row(1), &[0.2, 0.4]);
    }

    #[test]
    fn min_max_skips_non_finite() {
        let mut img = ImageF32::from_fn(3, 1, |x, _| x as f32 - 1.0);
        img.set(1, 0, f32::NAN);
        assert_eq!(img.min_max(), Some((-1.0, 1.0)));
        assert_eq!(ImageF32::new(0, 0).min_max(), None);
    }
}
