use gilrs::{Axis, Button, Gilrs};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info};

use crate::gamepad::error::GamepadError;
use crate::gamepad::state::{round_to_tenth, GamepadState};

// Unrounded values as reported by a backend
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawReading {
    pub buttons: Vec<f32>,
    pub axes: Vec<f32>,
}

/// Native gamepad capability, queried by device index.
///
/// `read` returns `None` when no device is present at `index`. Button values
/// must already be normalized to `[0.0, 1.0]` and axes to `[-1.0, 1.0]`.
pub trait GamepadSource: Send + fmt::Debug {
    fn read(&mut self, index: usize) -> Option<RawReading>;
}

/// Reads the current state of the device at `index`.
///
/// Axes are rounded to one decimal place, buttons are copied verbatim.
pub fn read_state(
    source: &mut dyn GamepadSource,
    index: usize,
) -> Result<GamepadState, GamepadError> {
    let raw = source
        .read(index)
        .ok_or(GamepadError::DeviceNotFound { index })?;

    Ok(GamepadState {
        buttons: raw.buttons,
        axes: raw.axes.into_iter().map(round_to_tenth).collect(),
    })
}

// Button order of the W3C "standard gamepad" layout
const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

const STANDARD_AXES: [Axis; 4] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
];

/// Native backend built on gilrs.
///
/// `index` selects the n-th connected gamepad in gilrs enumeration order.
#[derive(Debug)]
pub struct GilrsSource {
    gilrs: Gilrs,
}

impl GilrsSource {
    pub fn new() -> Result<Self, GamepadError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(GamepadError::Backend(e.to_string()));
            }
        };

        for (idx, (id, gamepad)) in gilrs.gamepads().enumerate() {
            info!("  [{}] ID: {}, Name: {}", idx, id, gamepad.name());
        }

        Ok(Self { gilrs })
    }
}

impl GamepadSource for GilrsSource {
    fn read(&mut self, index: usize) -> Option<RawReading> {
        // gilrs only updates its cached state while events are drained
        while let Some(event) = self.gilrs.next_event() {
            debug!("Drained gilrs event: {:?}", event.event);
        }

        let (_, gamepad) = self.gilrs.gamepads().nth(index)?;

        let buttons = STANDARD_BUTTONS
            .iter()
            .map(|button| {
                gamepad
                    .button_data(*button)
                    .map(|data| data.value())
                    .unwrap_or(0.0)
            })
            .collect();
        let axes = STANDARD_AXES
            .iter()
            .map(|axis| gamepad.value(*axis))
            .collect();

        Some(RawReading { buttons, axes })
    }
}

/// In-memory gamepad for tests and headless use.
///
/// Clones share the same pad, so a test can keep one clone and hand the other
/// to a [`GamepadDevice`](crate::gamepad::GamepadDevice). The pad answers at
/// every index while connected.
#[derive(Clone, Debug)]
pub struct VirtualSource {
    pad: Arc<Mutex<Option<RawReading>>>,
}

impl VirtualSource {
    pub fn new(buttons: usize, axes: usize) -> Self {
        Self::with_reading(RawReading {
            buttons: vec![0.0; buttons],
            axes: vec![0.0; axes],
        })
    }

    pub fn with_reading(reading: RawReading) -> Self {
        Self {
            pad: Arc::new(Mutex::new(Some(reading))),
        }
    }

    /// A source with nothing plugged in.
    pub fn disconnected() -> Self {
        Self {
            pad: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_button(&self, id: usize, value: f32) {
        self.update(|reading| set_slot(&mut reading.buttons, id, value));
    }

    pub fn set_axis(&self, id: usize, value: f32) {
        self.update(|reading| set_slot(&mut reading.axes, id, value));
    }

    pub fn disconnect(&self) {
        *self.pad.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn connect(&self, reading: RawReading) {
        *self.pad.lock().unwrap_or_else(PoisonError::into_inner) = Some(reading);
    }

    fn update(&self, f: impl FnOnce(&mut RawReading)) {
        let mut guard = self.pad.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reading) = guard.as_mut() {
            f(reading);
        }
    }
}

fn set_slot(values: &mut Vec<f32>, id: usize, value: f32) {
    if values.len() <= id {
        values.resize(id + 1, 0.0);
    }
    values[id] = value;
}

impl GamepadSource for VirtualSource {
    fn read(&mut self, _index: usize) -> Option<RawReading> {
        self.pad
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_state_rounds_axes_only() {
        let mut source = VirtualSource::with_reading(RawReading {
            buttons: vec![0.33],
            axes: vec![0.58, -0.25, 0.04],
        });
        let state = read_state(&mut source, 0).unwrap();
        assert_eq!(state.buttons, vec![0.33]);
        assert_eq!(state.axes, vec![0.6, -0.3, 0.0]);
    }

    #[test]
    fn read_state_reports_missing_device() {
        let mut source = VirtualSource::disconnected();
        let err = read_state(&mut source, 2).unwrap_err();
        assert!(matches!(err, GamepadError::DeviceNotFound { index: 2 }));
    }

    #[test]
    fn clones_share_the_pad() {
        let handle = VirtualSource::new(2, 1);
        let mut reader = handle.clone();
        handle.set_button(1, 1.0);
        handle.set_axis(0, -0.7);
        let raw = reader.read(0).unwrap();
        assert_eq!(raw.buttons, vec![0.0, 1.0]);
        assert_eq!(raw.axes, vec![-0.7]);

        handle.disconnect();
        assert!(reader.read(0).is_none());
        // Writes while unplugged are dropped.
        handle.set_button(0, 1.0);
        assert!(reader.read(0).is_none());
    }

    #[test]
    fn set_slot_grows_the_pad() {
        let handle = VirtualSource::new(0, 0);
        let mut reader = handle.clone();
        handle.set_button(3, 0.5);
        assert_eq!(reader.read(0).unwrap().buttons, vec![0.0, 0.0, 0.0, 0.5]);
    }
}
