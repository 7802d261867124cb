//! Owned single-channel f32 field in row-major layout (stride == width).
//!
//! Used for every 2-D numeric array in the crate: input images, density maps,
//! power spectra and unrolled polar fields (rows = angle, cols = radius).
use crate::error::ScaleError;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Width in pixels (number of columns)
    pub w: usize,
    /// Height in pixels (number of rows)
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every element set to `value`.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap an existing row-major buffer, checking that its length is `w × h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Result<Self, ScaleError> {
        if w == 0 || h == 0 {
            return Err(ScaleError::geometry(format!("empty field {w}x{h}")));
        }
        if data.len() != w * h {
            return Err(ScaleError::geometry(format!(
                "buffer of {} values does not match {w}x{h}",
                data.len()
            )));
        }
        Ok(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Build a field by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut img = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.data[y * w + x] = f(x, y);
            }
        }
        img
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        &mut self.data[start..start + self.w]
    }

    pub fn is_square(&self) -> bool {
        self.w == self.h
    }

    /// Smaller of width and height.
    pub fn min_dim(&self) -> usize {
        self.w.min(self.h)
    }

    /// Largest finite value, if any.
    pub fn max_finite(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
    }
}
