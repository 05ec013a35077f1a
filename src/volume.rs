use crate::enums::Orientation;
use crate::render::RenderError;

use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use std::fmt;

/// Descriptive attributes of a loaded series, for display only.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeHeader {
    pub rows: usize,
    pub columns: usize,
    pub slice_thickness: Option<f64>,
    pub pixel_spacing: Option<(f64, f64)>,
    pub slice_count: usize,
}

impl fmt::Display for VolumeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size: {}x{}", self.rows, self.columns)?;
        match self.slice_thickness {
            Some(thickness) => writeln!(f, "Thickness: {thickness}mm")?,
            None => writeln!(f, "Thickness: N/A")?,
        }
        if let Some((row, column)) = self.pixel_spacing {
            writeln!(f, "Spacing: {row}x{column}mm")?;
        }
        write!(f, "Slices: {}", self.slice_count)
    }
}

/// Calibrated intensities stacked along the slice axis, shape `(Z, Y, X)`.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    header: VolumeHeader,
}

impl Volume {
    pub fn new(data: Array3<f32>, header: VolumeHeader) -> Self {
        Self { data, header }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn header(&self) -> &VolumeHeader {
        &self.header
    }

    /// Number of slices available along the axis an orientation cuts through.
    pub fn axis_len(&self, orientation: Orientation) -> usize {
        let dim = self.data.dim();
        match orientation {
            Orientation::Axial => dim.0,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.2,
        }
    }

    /// Middle index along the axis, `len / 2`.
    pub fn center_index(&self, orientation: Orientation) -> usize {
        self.axis_len(orientation) / 2
    }

    /// Borrow one plane of the volume.
    ///
    /// Axial planes are `Y x X`, coronal `Z x X` and sagittal `Z x Y`.
    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Result<ArrayView2<'_, f32>, RenderError> {
        let len = self.axis_len(orientation);
        if index >= len {
            return Err(RenderError::IndexOutOfBounds {
                orientation,
                index,
                len,
            });
        }
        let slice = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Ok(slice)
    }
}
