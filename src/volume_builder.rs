use crate::{
    raw_slice::{DecodeError, RawSlice, scan_directory},
    volume::{Volume, VolumeHeader},
};

use ndarray::{Array2, Array3, s};
use std::{io, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No slices with a usable image position")]
    NoValidSlices,

    #[error("Inconsistent image dimensions: expected {expected:?}, found {found:?}")]
    InconsistentDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Build(#[from] BuildError),
}

pub struct VolumeBuilder;

impl VolumeBuilder {
    /// Build a volume from decoded slices
    ///
    /// Slices without a usable position are dropped, the rest are ordered by
    /// ascending position along the stacking axis (input order breaks ties),
    /// calibrated with their rescale slope and intercept and stacked.
    ///
    /// # Errors
    ///
    /// Returns error if no slice can be placed or dimensions are inconsistent
    pub fn build(raw_slices: Vec<RawSlice>) -> Result<Volume, BuildError> {
        let mut slices_with_order: Vec<_> = raw_slices
            .into_iter()
            .filter_map(|slice| slice.stacking_position().map(|z| (z, slice)))
            .collect();

        if slices_with_order.is_empty() {
            return Err(BuildError::NoValidSlices);
        }

        Self::sort_slices(&mut slices_with_order);

        let slices: Vec<_> = slices_with_order
            .into_iter()
            .map(|(_, slice)| slice)
            .collect();

        Self::validate_dimensions(&slices)?;

        let header = Self::header(&slices);
        let volume_array = Self::build_volume_array(&slices);
        debug!("built volume with shape {:?}", volume_array.dim());

        Ok(Volume::new(volume_array, header))
    }

    /// Build a volume from the outcome of a decode stage, skipping failures
    pub fn build_from_decoded(
        decoded: impl IntoIterator<Item = Result<RawSlice, DecodeError>>,
    ) -> Result<Volume, BuildError> {
        let mut skipped = 0usize;
        let slices: Vec<_> = decoded
            .into_iter()
            .filter_map(|result| match result {
                Ok(slice) => Some(slice),
                Err(err) => {
                    warn!("skipping undecodable slice: {err}");
                    skipped += 1;
                    None
                }
            })
            .collect();
        if skipped > 0 {
            debug!("{skipped} file(s) skipped, {} decoded", slices.len());
        }
        Self::build(slices)
    }

    /// Load a volume from a directory containing .dcm files
    pub fn load_from_directory(path: impl AsRef<Path>) -> Result<Volume, LoadError> {
        let decoded = scan_directory(path)?;
        Ok(Self::build_from_decoded(decoded)?)
    }

    fn sort_slices(slices_with_order: &mut [(f64, RawSlice)]) {
        // stable, so equal positions keep input order
        slices_with_order.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    fn validate_dimensions(slices: &[RawSlice]) -> Result<(), BuildError> {
        let expected = slices[0].pixel_data.dim();
        match slices.iter().find(|slice| slice.pixel_data.dim() != expected) {
            Some(slice) => Err(BuildError::InconsistentDimensions {
                expected,
                found: slice.pixel_data.dim(),
            }),
            None => Ok(()),
        }
    }

    fn calibrate(slice: &RawSlice) -> Array2<f32> {
        let slope = slice.rescale_slope as f32;
        let intercept = slice.rescale_intercept as f32;
        slice.pixel_data.mapv(|v| v as f32 * slope + intercept)
    }

    fn build_volume_array(slices: &[RawSlice]) -> Array3<f32> {
        let (height, width) = slices[0].pixel_data.dim();
        let depth = slices.len();
        let mut volume = Array3::<f32>::zeros((depth, height, width));

        for (i, slice) in slices.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(&Self::calibrate(slice));
        }

        volume
    }

    fn header(slices: &[RawSlice]) -> VolumeHeader {
        let first = &slices[0];
        VolumeHeader {
            rows: first.rows(),
            columns: first.columns(),
            slice_thickness: first.slice_thickness,
            pixel_spacing: first.pixel_spacing,
            slice_count: slices.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn uniform(value: i32, z: f64) -> RawSlice {
        RawSlice::new(Array2::from_elem((4, 4), value), Some([0.0, 0.0, z]))
    }

    #[test]
    fn orders_slices_by_position() {
        let volume =
            VolumeBuilder::build(vec![uniform(10, 10.0), uniform(0, 0.0), uniform(5, 5.0)])
                .unwrap();
        assert_eq!(volume.dim(), (3, 4, 4));
        let firsts: Vec<f32> = (0..3).map(|z| volume.data()[[z, 0, 0]]).collect();
        assert_eq!(firsts, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn stacking_order_is_non_decreasing() {
        let positions = [3.5, -2.0, 8.0, 0.0, -7.25, 3.5, 1.0];
        let slices = positions
            .iter()
            .map(|&z| uniform((z * 4.0) as i32, z))
            .collect();
        let volume = VolumeBuilder::build(slices).unwrap();
        let stacked: Vec<f32> = (0..positions.len())
            .map(|z| volume.data()[[z, 0, 0]])
            .collect();
        assert!(stacked.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn equal_positions_keep_input_order() {
        let volume =
            VolumeBuilder::build(vec![uniform(1, 2.0), uniform(2, 2.0), uniform(0, 1.0)])
                .unwrap();
        let firsts: Vec<f32> = (0..3).map(|z| volume.data()[[z, 0, 0]]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_input_has_no_valid_slices() {
        assert!(matches!(
            VolumeBuilder::build(vec![]),
            Err(BuildError::NoValidSlices)
        ));
    }

    #[test]
    fn slices_without_position_are_dropped() {
        let unplaced = RawSlice::new(Array2::zeros((4, 4)), None);
        assert!(matches!(
            VolumeBuilder::build(vec![unplaced.clone(), unplaced]),
            Err(BuildError::NoValidSlices)
        ));

        let unplaced = RawSlice::new(Array2::zeros((2, 2)), None);
        let volume = VolumeBuilder::build(vec![unplaced, uniform(1, 0.0)]).unwrap();
        assert_eq!(volume.dim(), (1, 4, 4));
        assert_eq!(volume.header().slice_count, 1);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let odd = RawSlice::new(Array2::zeros((4, 5)), Some([0.0, 0.0, 3.0]));
        let err = VolumeBuilder::build(vec![uniform(0, 0.0), odd]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InconsistentDimensions {
                expected: (4, 4),
                found: (4, 5)
            }
        ));
    }

    #[test]
    fn applies_rescale_per_slice() {
        let ct = uniform(1000, 0.0).with_rescale(1.0, -1024.0);
        let scaled = uniform(3, 1.0).with_rescale(2.5, 0.5);
        let volume = VolumeBuilder::build(vec![ct, scaled]).unwrap();
        assert_eq!(volume.data()[[0, 2, 2]], -24.0);
        assert_eq!(volume.data()[[1, 3, 0]], 8.0);
    }

    #[test]
    fn decode_failures_are_skipped() {
        let decoded = vec![
            Err(DecodeError::NoFrames),
            Ok(uniform(7, 1.0)),
            Err(DecodeError::NoFrames),
        ];
        let volume = VolumeBuilder::build_from_decoded(decoded).unwrap();
        assert_eq!(volume.dim(), (1, 4, 4));

        let all_failed = vec![Err(DecodeError::NoFrames)];
        assert!(matches!(
            VolumeBuilder::build_from_decoded(all_failed),
            Err(BuildError::NoValidSlices)
        ));
    }

    #[test]
    fn header_comes_from_first_ordered_slice() {
        let mut first = uniform(0, -1.0);
        first.slice_thickness = Some(2.0);
        first.pixel_spacing = Some((0.7, 0.7));
        let mut later = uniform(0, 4.0);
        later.slice_thickness = Some(5.0);
        let volume = VolumeBuilder::build(vec![later, first]).unwrap();
        let header = volume.header();
        assert_eq!((header.rows, header.columns), (4, 4));
        assert_eq!(header.slice_thickness, Some(2.0));
        assert_eq!(header.pixel_spacing, Some((0.7, 0.7)));
        assert_eq!(header.slice_count, 2);
    }

    #[test]
    fn loading_missing_directory_is_io_error() {
        assert!(matches!(
            VolumeBuilder::load_from_directory("no/such/series"),
            Err(LoadError::Io(_))
        ));
    }
}
