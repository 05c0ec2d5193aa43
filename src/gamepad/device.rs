use chrono::Local;
use tracing::{debug, info};

use crate::gamepad::error::GamepadError;
use crate::gamepad::event::{EventKind, GamepadEvent};
use crate::gamepad::listener::{Listener, ListenerId, ListenerRegistry};
use crate::gamepad::source::{read_state, GamepadSource};
use crate::gamepad::state::{diff, GamepadState, StateDiff};

/// One gamepad at a fixed index, its last snapshot and its listeners.
///
/// `poll` runs a single read-diff-dispatch cycle. For a recurring cycle hand
/// the device to [`GamepadDevice::spawn`](crate::gamepad::poller).
#[derive(Debug)]
pub struct GamepadDevice {
    // Device index inside the source
    index: usize,

    // Native capability
    source: Box<dyn GamepadSource>,

    // Last snapshot, replaced on every poll
    state: GamepadState,

    listeners: ListenerRegistry,
}

impl GamepadDevice {
    // Fails with DeviceNotFound when nothing is plugged in at `index`
    pub fn open(
        source: impl GamepadSource + 'static,
        index: usize,
    ) -> Result<Self, GamepadError> {
        Self::open_boxed(Box::new(source), index)
    }

    pub fn open_boxed(
        mut source: Box<dyn GamepadSource>,
        index: usize,
    ) -> Result<Self, GamepadError> {
        debug!("Opening gamepad at index {} from {:?}", index, source);
        let state = read_state(source.as_mut(), index)?;
        info!(
            "Opened gamepad {}: {} buttons, {} axes",
            index,
            state.buttons.len(),
            state.axes.len()
        );

        Ok(Self {
            index,
            source,
            state,
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> &GamepadState {
        &self.state
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    // Register by event name; an unknown name registers nothing
    pub fn on(
        &mut self,
        kind: &str,
        listener: impl Listener + 'static,
    ) -> Result<ListenerId, GamepadError> {
        let kind: EventKind = kind.parse()?;
        Ok(self.on_kind(kind, listener))
    }

    pub fn on_kind(&mut self, kind: EventKind, listener: impl Listener + 'static) -> ListenerId {
        self.add_boxed(kind, Box::new(listener))
    }

    pub(crate) fn add_boxed(
        &mut self,
        kind: EventKind,
        listener: Box<dyn Listener>,
    ) -> ListenerId {
        let id = self.listeners.add(kind, listener);
        debug!("Registered {} listener {:?} on gamepad {}", kind, id, self.index);
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Runs one poll tick and returns the number of events raised.
    ///
    /// The stored state is replaced before any listener runs. If the device
    /// vanished the stored state is left untouched and `DeviceNotFound` is
    /// returned.
    pub fn poll(&mut self) -> Result<usize, GamepadError> {
        let new_state = read_state(self.source.as_mut(), self.index)?;
        let delta = diff(&self.state, &new_state);
        self.state = new_state;

        if delta.is_empty() {
            return Ok(0);
        }
        Ok(self.dispatch_diff(&delta))
    }

    // Buttons ascending, then axes ascending
    fn dispatch_diff(&mut self, delta: &StateDiff) -> usize {
        let at = Local::now();
        let mut raised = 0;

        for (id, &delta_value) in delta.buttons.iter().enumerate() {
            if delta_value == 0.0 {
                continue;
            }
            let event = GamepadEvent {
                kind: EventKind::for_button_delta(delta_value),
                id,
                current_value: self.state.button(id),
                delta_value,
                at,
            };
            debug!(
                "Button {} {} (value {:.2}, delta {:+.2})",
                id, event.kind, event.current_value, delta_value
            );
            self.listeners.dispatch(&event);
            raised += 1;
        }

        for (id, &delta_value) in delta.axes.iter().enumerate() {
            if delta_value == 0.0 {
                continue;
            }
            let event = GamepadEvent {
                kind: EventKind::AxisMoved,
                id,
                current_value: self.state.axis(id),
                delta_value,
                at,
            };
            debug!(
                "Axis {} moved (value {:.1}, delta {:+.1})",
                id, event.current_value, delta_value
            );
            self.listeners.dispatch(&event);
            raised += 1;
        }

        raised
    }
}
