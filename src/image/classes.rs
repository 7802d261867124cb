//! Channel-major stack of per-class weight maps aligned with a density field.
use super::ImageF32;
use crate::error::ScaleError;

/// Class weights laid out as `(channel, row, col)`, channel-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassField {
    pub channels: usize,
    pub w: usize,
    pub h: usize,
    pub data: Vec<f32>,
}

impl ClassField {
    pub fn new(channels: usize, w: usize, h: usize) -> Self {
        Self {
            channels,
            w,
            h,
            data: vec![0.0; channels * w * h],
        }
    }

    pub fn from_vec(
        channels: usize,
        w: usize,
        h: usize,
        data: Vec<f32>,
    ) -> Result<Self, ScaleError> {
        if channels == 0 {
            return Err(ScaleError::geometry("class field needs at least one channel"));
        }
        if data.len() != channels * w * h {
            return Err(ScaleError::geometry(format!(
                "class buffer of {} values does not match {channels}x{w}x{h}",
                data.len()
            )));
        }
        Ok(Self {
            channels,
            w,
            h,
            data,
        })
    }

    /// Stack single-channel maps of identical shape.
    pub fn from_channels(maps: &[ImageF32]) -> Result<Self, ScaleError> {
        let first = maps
            .first()
            .ok_or_else(|| ScaleError::geometry("class field needs at least one channel"))?;
        let (w, h) = (first.w, first.h);
        let mut data = Vec::with_capacity(maps.len() * w * h);
        for map in maps {
            if map.w != w || map.h != h {
                return Err(ScaleError::geometry(format!(
                    "class channel {}x{} does not match {w}x{h}",
                    map.w, map.h
                )));
            }
            data.extend_from_slice(&map.data);
        }
        Self::from_vec(maps.len(), w, h, data)
    }

    #[inline]
    pub fn get(&self, channel: usize, pixel: usize) -> f32 {
        self.data[channel * self.w * self.h + pixel]
    }

    pub fn set(&mut self, channel: usize, x: usize, y: usize, v: f32) {
        let i = channel * self.w * self.h + y * self.w + x;
        self.data[i] = v;
    }

    /// Spatial shape must equal the score field's.
    pub fn matches(&self, scores: &ImageF32) -> bool {
        self.w == scores.w && self.h == scores.h
    }
}
