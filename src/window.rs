use ndarray::{Array2, ArrayView2, Zip};

use crate::render::RenderError;

pub const DEFAULT_WINDOW_WIDTH: i32 = 2000;
pub const DEFAULT_WINDOW_LEVEL: i32 = 500;

/// Window width and level used to map calibrated intensities to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub width: i32,
    pub level: i32,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            level: DEFAULT_WINDOW_LEVEL,
        }
    }
}

impl Window {
    pub fn new(width: i32, level: i32) -> Self {
        Self { width, level }
    }

    /// Lower and upper intensity of the window.
    ///
    /// The half width is floor-divided, so an odd width spans `width - 1`.
    /// Computed in `i64`, so any `i32` level and width fit.
    pub fn bounds(&self) -> (i64, i64) {
        let half = i64::from(self.width).div_euclid(2);
        let level = i64::from(self.level);
        (level - half, level + half)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width <= 0 {
            return Err(RenderError::InvalidWindow { width: self.width });
        }
        Ok(())
    }

    #[inline]
    fn map_value(value: f32, lower: f32, upper: f32, width: f32) -> u8 {
        ((value.clamp(lower, upper) - lower) / width * 255.0).clamp(0.0, 255.0) as u8
    }

    /// Map every sample of a plane to display brightness.
    pub fn apply_to_slice(&self, slice: &ArrayView2<'_, f32>) -> Result<Array2<u8>, RenderError> {
        self.validate()?;
        let (lower, upper) = self.bounds();
        let (lower, upper, width) = (lower as f32, upper as f32, self.width as f32);
        Ok(Zip::from(slice).par_map_collect(|&v| Self::map_value(v, lower, upper, width)))
    }
}
