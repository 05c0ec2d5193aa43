//! Gamepad snapshots and the differ that compares two of them.
//!
//! A [`GamepadState`] is replaced wholesale on every poll and never mutated in
//! place. [`diff`] turns two consecutive snapshots into a [`StateDiff`] whose
//! non-zero entries become events.
//!
//! ## Precision
//! - **Axes** are rounded to one decimal place when they are read, so jitter
//!   below 0.1 never shows up as a change. Axis deltas are not rounded again.
//! - **Buttons** are stored with full precision. Button deltas are rounded to
//!   one decimal place, which means a raw change smaller than 0.05 yields a
//!   zero delta.

/// Immutable recording of all button and axis values at one instant.
///
/// Index is the button or axis id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GamepadState {
    /// Button values in `[0.0, 1.0]`
    pub buttons: Vec<f32>,
    /// Axis values in `[-1.0, 1.0]`, rounded to one decimal place
    pub axes: Vec<f32>,
}

impl GamepadState {
    pub fn new(buttons: Vec<f32>, axes: Vec<f32>) -> Self {
        Self { buttons, axes }
    }

    #[inline]
    pub fn button(&self, id: usize) -> f32 {
        self.buttons.get(id).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn axis(&self, id: usize) -> f32 {
        self.axes.get(id).copied().unwrap_or(0.0)
    }
}

/// Per-index signed change between two snapshots. `0.0` means unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateDiff {
    pub buttons: Vec<f32>,
    pub axes: Vec<f32>,
}

impl StateDiff {
    /// True when no button or axis changed.
    pub fn is_empty(&self) -> bool {
        self.buttons.iter().chain(self.axes.iter()).all(|d| *d == 0.0)
    }
}

/// Rounds to one decimal place, halves away from zero (`0.25 -> 0.3`).
///
/// The scaling runs in `f64` so the decision is made on the value the `f32`
/// actually holds. `0.35f32` is stored as 0.34999999 and rounds to 0.3.
#[inline]
pub fn round_to_tenth(value: f32) -> f32 {
    ((value as f64 * 10.0).round() / 10.0) as f32
}

/// Computes the delta between `old` and `new`.
///
/// The result has the length of `new`. Ids missing from `old` compare against
/// `0.0`.
pub fn diff(old: &GamepadState, new: &GamepadState) -> StateDiff {
    let buttons = new
        .buttons
        .iter()
        .enumerate()
        .map(|(id, &value)| {
            let previous = old.button(id);
            if value != previous {
                round_to_tenth(value - previous)
            } else {
                0.0
            }
        })
        .collect();

    let axes = new
        .axes
        .iter()
        .enumerate()
        .map(|(id, &value)| {
            let previous = old.axis(id);
            if value != previous {
                value - previous
            } else {
                0.0
            }
        })
        .collect();

    StateDiff { buttons, axes }
}
