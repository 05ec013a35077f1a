//! # DICOM-orthoview library
//!
//! This crate reconstructs a series of single-slice DICOM files into a
//! calibrated volume and renders windowed cross-sections of it.
//!
//! Loading happens in two stages. Each `.dcm` file of a folder is decoded
//! into a [`RawSlice`] (files that fail to decode are logged and skipped),
//! then [`VolumeBuilder`] drops slices without an Image Position, orders the
//! rest along the stacking axis, applies Rescale Slope/Intercept and stacks
//! them into a [`Volume`]. Decoding runs in parallel using rayon.
//!
//! The volume is browsed through an immutable [`ViewState`] holding one
//! index per plane plus a [`Window`]:
//!  - Axial
//!  - Coronal
//!  - Sagittal
//!
//! Every plane is windowed with the same formula and resampled to one
//! square output size with one filter, Lanczos3 unless configured
//! otherwise, so planes of different aspect ratios line up on screen.
//!
//! # Examples
//!
//! ## Rendering the centre of a series
//!
//! ```no_run
//! # use dicom_orthoview::{VolumeBuilder, ViewState, Window, render};
//! let volume = VolumeBuilder::load_from_directory("dicom")
//!     .expect("should have loaded files from directory");
//! let view = ViewState::centered(&volume, Window::new(400, 40));
//! let views = render(&volume, &view).expect("should have rendered all planes");
//! views.sagittal.image.save("sagittal.png");
//! ```

pub mod enums;
pub mod raw_slice;
pub mod render;
pub mod view_state;
pub mod volume;
pub mod volume_builder;
pub mod window;

pub use enums::{Orientation, ResizeFilter};
pub use raw_slice::{DecodeError, RawSlice, decode_file, scan_directory};
pub use render::{RenderError, RenderOptions, RenderedPlane, RenderedViews, render};
pub use view_state::{ViewBounds, ViewState};
pub use volume::{Volume, VolumeHeader};
pub use volume_builder::{BuildError, LoadError, VolumeBuilder};
pub use window::Window;
