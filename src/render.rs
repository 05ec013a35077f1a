use crate::enums::{Orientation, ResizeFilter};
use crate::view_state::ViewState;
use crate::volume::Volume;

use image::{GrayImage, Luma, imageops};
use ndarray::Array2;
use thiserror::Error;

pub const DEFAULT_OUTPUT_SIZE: u32 = 380;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{} index {index} out of bounds for axis of length {len}", .orientation.name())]
    IndexOutOfBounds {
        orientation: Orientation,
        index: usize,
        len: usize,
    },

    #[error("Window width must be positive, got {width}")]
    InvalidWindow { width: i32 },
}

/// Output geometry for rendered planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Side length of the square output images, in pixels.
    pub output_size: u32,
    pub filter: ResizeFilter,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            filter: ResizeFilter::default(),
        }
    }
}

/// One windowed plane, resampled to the output size.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlane {
    pub orientation: Orientation,
    /// Slice index the plane was taken at. Drawing it onto the image is
    /// left to the caller.
    pub index: usize,
    pub image: GrayImage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedViews {
    pub axial: RenderedPlane,
    pub sagittal: RenderedPlane,
    pub coronal: RenderedPlane,
}

impl RenderedViews {
    pub fn planes(&self) -> [&RenderedPlane; 3] {
        [&self.axial, &self.sagittal, &self.coronal]
    }
}

/// Render the three planes of `view` with the default options.
pub fn render(volume: &Volume, view: &ViewState) -> Result<RenderedViews, RenderError> {
    RenderOptions::default().render(volume, view)
}

impl RenderOptions {
    pub fn render(&self, volume: &Volume, view: &ViewState) -> Result<RenderedViews, RenderError> {
        view.window.validate()?;
        Ok(RenderedViews {
            axial: self.render_plane(volume, view, Orientation::Axial)?,
            sagittal: self.render_plane(volume, view, Orientation::Sagittal)?,
            coronal: self.render_plane(volume, view, Orientation::Coronal)?,
        })
    }

    pub fn render_plane(
        &self,
        volume: &Volume,
        view: &ViewState,
        orientation: Orientation,
    ) -> Result<RenderedPlane, RenderError> {
        let index = view.index(orientation);
        let slice = volume.get_slice_from_axis(index, orientation)?;
        let windowed = view.window.apply_to_slice(&slice)?;
        Ok(RenderedPlane {
            orientation,
            index,
            image: self.resize(&windowed),
        })
    }

    fn resize(&self, plane: &Array2<u8>) -> GrayImage {
        let (height, width) = plane.dim();
        let image = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            Luma([plane[[y as usize, x as usize]]])
        });
        imageops::resize(
            &image,
            self.output_size,
            self.output_size,
            self.filter.into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_slice::RawSlice;
    use crate::volume_builder::VolumeBuilder;
    use crate::window::Window;
    use ndarray::Array2;

    fn slice(value: i32, z: f64) -> RawSlice {
        RawSlice::new(Array2::from_elem((4, 4), value), Some([0.0, 0.0, z]))
    }

    fn options() -> RenderOptions {
        RenderOptions {
            output_size: 8,
            filter: ResizeFilter::Nearest,
        }
    }

    #[test]
    fn axial_index_follows_stacking_order() {
        let volume =
            VolumeBuilder::build(vec![slice(100, 10.0), slice(0, 0.0), slice(50, 5.0)]).unwrap();
        assert_eq!(volume.dim(), (3, 4, 4));
        let view = ViewState::centered(&volume, Window::new(100, 50));
        assert_eq!(view.axial_index, 1);

        let views = options().render(&volume, &view).unwrap();
        assert_eq!(views.axial.index, 1);
        // (50 - 0) / 100 * 255 truncates to 127
        assert!(views.axial.image.pixels().all(|p| p.0[0] == 127));
    }

    #[test]
    fn uniform_volume_renders_mid_grey_everywhere() {
        let volume = VolumeBuilder::build(vec![slice(500, 0.0), slice(500, 1.0)]).unwrap();
        let view = ViewState::centered(&volume, Window::new(200, 500));
        let views = render(&volume, &view).unwrap();
        for plane in views.planes() {
            assert_eq!(plane.image.dimensions(), (380, 380));
            assert!(plane.image.pixels().all(|p| p.0[0] == 127 || p.0[0] == 128));
        }
    }

    #[test]
    fn planes_share_output_size_and_carry_indices() {
        let slices = (0..3).map(|z| slice(z * 10, z as f64)).collect();
        let volume = VolumeBuilder::build(slices).unwrap();
        let view = ViewState::default()
            .with_index(Orientation::Axial, 2)
            .with_index(Orientation::Sagittal, 3)
            .with_index(Orientation::Coronal, 1);
        let views = options().render(&volume, &view).unwrap();
        assert_eq!(views.axial.index, 2);
        assert_eq!(views.sagittal.index, 3);
        assert_eq!(views.coronal.index, 1);
        assert_eq!(views.sagittal.orientation, Orientation::Sagittal);
        for plane in views.planes() {
            assert_eq!(plane.image.dimensions(), (8, 8));
        }
    }

    #[test]
    fn window_spanning_min_to_max_hits_both_ends() {
        let volume = VolumeBuilder::build(vec![slice(-200, 0.0), slice(600, 1.0)]).unwrap();
        // lower = -200, upper = 600
        let view = ViewState::default()
            .with_window(Window::new(800, 200))
            .with_index(Orientation::Sagittal, 0);
        let sagittal = options()
            .render_plane(&volume, &view, Orientation::Sagittal)
            .unwrap();
        // sagittal rows run along z: top half is the min slice, bottom half the max
        assert_eq!(sagittal.image.get_pixel(0, 0).0[0], 0);
        assert_eq!(sagittal.image.get_pixel(0, 7).0[0], 255);
    }

    #[test]
    fn rendering_is_repeatable() {
        let slices = (0..5)
            .map(|z| {
                let data = Array2::from_shape_fn((6, 9), |(y, x)| (x * 37 + y * 11) as i32 * z);
                RawSlice::new(data, Some([0.0, 0.0, z as f64]))
            })
            .collect();
        let volume = VolumeBuilder::build(slices).unwrap();
        let view = ViewState::centered(&volume, Window::new(300, 120));
        let first = render(&volume, &view).unwrap();
        let second = render(&volume, &view).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn axial_index_one_past_end_is_out_of_bounds() {
        let volume = VolumeBuilder::build(vec![slice(0, 0.0), slice(0, 1.0)]).unwrap();
        let view = ViewState::default().with_index(Orientation::Axial, 2);
        assert!(matches!(
            render(&volume, &view),
            Err(RenderError::IndexOutOfBounds {
                orientation: Orientation::Axial,
                index: 2,
                len: 2
            })
        ));
    }

    #[test]
    fn zero_width_window_is_invalid() {
        let volume = VolumeBuilder::build(vec![slice(0, 0.0)]).unwrap();
        let view = ViewState::centered(&volume, Window::new(0, 500));
        assert!(matches!(
            render(&volume, &view),
            Err(RenderError::InvalidWindow { width: 0 })
        ));
    }
}
