use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, s};
use rayon::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("DICOM error: {0}")]
    Read(#[from] dicom::object::ReadError),

    #[error("Pixel data error: {0}")]
    PixelData(#[from] dicom::pixeldata::Error),

    #[error("Pixel data contains no frames")]
    NoFrames,
}

/// A single decoded image together with the attributes needed to place it
/// in a volume.
#[derive(Debug, Clone)]
pub struct RawSlice {
    /// Stored sample values, `rows x columns`, before calibration.
    pub pixel_data: Array2<i32>,
    /// Image Position (Patient), if present with three components.
    pub position: Option<[f64; 3]>,
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
    pub slice_thickness: Option<f64>,
    /// Row and column spacing in mm.
    pub pixel_spacing: Option<(f64, f64)>,
}

impl RawSlice {
    /// Create a slice from stored samples with identity calibration and no
    /// descriptive metadata.
    pub fn new(pixel_data: Array2<i32>, position: Option<[f64; 3]>) -> Self {
        Self {
            pixel_data,
            position,
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
            slice_thickness: None,
            pixel_spacing: None,
        }
    }

    pub fn with_rescale(mut self, slope: f64, intercept: f64) -> Self {
        self.rescale_slope = slope;
        self.rescale_intercept = intercept;
        self
    }

    pub fn rows(&self) -> usize {
        self.pixel_data.nrows()
    }

    pub fn columns(&self) -> usize {
        self.pixel_data.ncols()
    }

    /// Coordinate along the stacking axis, if it can be used for ordering.
    pub fn stacking_position(&self) -> Option<f64> {
        self.position.map(|p| p[2]).filter(|z| z.is_finite())
    }

    /// Decode the first frame of a DICOM object.
    ///
    /// Samples are kept as stored: the modality LUT is not applied here, the
    /// rescale attributes are carried along instead.
    pub fn from_dicom_object(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Self, DecodeError> {
        let pixel_data = Self::decode_first_frame(dicom_object)?;
        let mut slice = Self::new(pixel_data, read_position(dicom_object));
        slice.rescale_slope = read_float(dicom_object, tags::RESCALE_SLOPE).unwrap_or(1.0);
        slice.rescale_intercept = read_float(dicom_object, tags::RESCALE_INTERCEPT).unwrap_or(0.0);
        slice.slice_thickness = read_float(dicom_object, tags::SLICE_THICKNESS);
        slice.pixel_spacing = read_pixel_spacing(dicom_object);
        Ok(slice)
    }

    fn decode_first_frame(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Array2<i32>, DecodeError> {
        let pixel_data = dicom_object.decode_pixel_data()?;
        if pixel_data.number_of_frames() == 0 {
            return Err(DecodeError::NoFrames);
        }
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let frames = pixel_data.to_ndarray_with_options::<i32>(&options)?;
        Ok(frames.slice_move(s![0, .., .., 0]))
    }
}

/// Open and decode a single DICOM file.
pub fn decode_file(path: impl AsRef<Path>) -> Result<RawSlice, DecodeError> {
    let dicom_object = open_file(path.as_ref())?;
    RawSlice::from_dicom_object(&dicom_object)
}

/// Decode every `.dcm` file in a directory.
///
/// Files are visited in path order and decoded in parallel; the returned
/// results keep that order so that later tie-breaks stay deterministic.
pub fn scan_directory(path: impl AsRef<Path>) -> io::Result<Vec<Result<RawSlice, DecodeError>>> {
    let paths = dicom_paths(path.as_ref())?;
    debug!("found {} DICOM files in {}", paths.len(), path.as_ref().display());
    Ok(paths.par_iter().map(decode_file).collect())
}

fn dicom_paths(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_dcm_extension(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn has_dcm_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
}

fn read_float(dicom_object: &InMemDicomObject, tag: dicom::core::Tag) -> Option<f64> {
    dicom_object.element(tag).ok()?.to_float64().ok()
}

fn read_position(dicom_object: &InMemDicomObject) -> Option<[f64; 3]> {
    let pos = dicom_object
        .element(tags::IMAGE_POSITION_PATIENT)
        .ok()?
        .to_multi_float64()
        .ok()?;
    match pos.as_slice() {
        [x, y, z, ..] => Some([*x, *y, *z]),
        _ => None,
    }
}

fn read_pixel_spacing(dicom_object: &InMemDicomObject) -> Option<(f64, f64)> {
    let spacing = dicom_object
        .element(tags::PIXEL_SPACING)
        .ok()?
        .to_multi_float64()
        .ok()?;
    match spacing.as_slice() {
        [row, column, ..] => Some((*row, *column)),
        _ => None,
    }
}
