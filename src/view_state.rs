use std::ops::RangeInclusive;

use crate::{enums::Orientation, volume::Volume, window::Window};

/// Cursor positions for the three planes and the shared window.
///
/// A `ViewState` is a plain value: interactions produce a new one through
/// the `with_*` methods instead of mutating the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub axial_index: usize,
    pub sagittal_index: usize,
    pub coronal_index: usize,
    pub window: Window,
}

impl ViewState {
    /// Indices at the volume centre with the given window.
    pub fn centered(volume: &Volume, window: Window) -> Self {
        Self {
            axial_index: volume.center_index(Orientation::Axial),
            sagittal_index: volume.center_index(Orientation::Sagittal),
            coronal_index: volume.center_index(Orientation::Coronal),
            window,
        }
    }

    /// State for a newly loaded volume: indices recentred, window kept.
    pub fn for_new_volume(&self, volume: &Volume) -> Self {
        Self::centered(volume, self.window)
    }

    pub fn index(&self, orientation: Orientation) -> usize {
        match orientation {
            Orientation::Axial => self.axial_index,
            Orientation::Coronal => self.coronal_index,
            Orientation::Sagittal => self.sagittal_index,
        }
    }

    pub fn with_index(self, orientation: Orientation, index: usize) -> Self {
        match orientation {
            Orientation::Axial => Self {
                axial_index: index,
                ..self
            },
            Orientation::Coronal => Self {
                coronal_index: index,
                ..self
            },
            Orientation::Sagittal => Self {
                sagittal_index: index,
                ..self
            },
        }
    }

    pub fn with_window(self, window: Window) -> Self {
        Self { window, ..self }
    }

    pub fn with_reset_window(self) -> Self {
        self.with_window(Window::default())
    }
}

/// Control ranges a user interface should offer.
///
/// Window ranges are policy defaults and may be changed freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBounds {
    pub window_width: RangeInclusive<i32>,
    pub window_level: RangeInclusive<i32>,
}

impl Default for ViewBounds {
    fn default() -> Self {
        Self {
            window_width: 1..=4000,
            window_level: -1000..=2000,
        }
    }
}

impl ViewBounds {
    /// Valid indices for a plane of the given volume, `None` if the axis is empty.
    pub fn index_range(volume: &Volume, orientation: Orientation) -> Option<RangeInclusive<usize>> {
        volume
            .axis_len(orientation)
            .checked_sub(1)
            .map(|last| 0..=last)
    }

    /// Pull every field of a state into range, the way bounded controls would.
    pub fn clamp(&self, view: ViewState, volume: &Volume) -> ViewState {
        let clamp_index = |orientation| {
            let last = volume.axis_len(orientation).saturating_sub(1);
            view.index(orientation).min(last)
        };
        ViewState {
            axial_index: clamp_index(Orientation::Axial),
            sagittal_index: clamp_index(Orientation::Sagittal),
            coronal_index: clamp_index(Orientation::Coronal),
            window: Window {
                width: view
                    .window
                    .width
                    .clamp(*self.window_width.start(), *self.window_width.end()),
                level: view
                    .window
                    .level
                    .clamp(*self.window_level.start(), *self.window_level.end()),
            },
        }
    }
}
