//! Listeners declared by name in the configuration file.
//!
//! The typed API only accepts closures, so a non-callable listener cannot be
//! registered there. Bindings read from disk can name anything, which is where
//! [`GamepadError::InvalidListener`] comes from.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

use crate::gamepad::{Dispatch, EventKind, GamepadDevice, GamepadError, GamepadEvent, ListenerId};

/// Built-in listener behaviors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerAction {
    /// Log the event at info level
    Log,
    /// Log the event at debug level
    Trace,
    /// Stop the chain, muting every listener registered after this one
    Swallow,
}

impl FromStr for ListenerAction {
    type Err = GamepadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(ListenerAction::Log),
            "trace" => Ok(ListenerAction::Trace),
            "swallow" => Ok(ListenerAction::Swallow),
            _ => Err(GamepadError::InvalidListener(s.to_string())),
        }
    }
}

impl ListenerAction {
    pub fn into_listener(self) -> impl FnMut(&GamepadEvent) -> Dispatch + Send + 'static {
        move |event: &GamepadEvent| match self {
            ListenerAction::Log => {
                info!(
                    "{} {}: value {:.2}, delta {:+.2}",
                    event.kind, event.id, event.current_value, event.delta_value
                );
                Dispatch::Continue
            }
            ListenerAction::Trace => {
                debug!("{:?}", event);
                Dispatch::Continue
            }
            ListenerAction::Swallow => Dispatch::StopDispatch,
        }
    }
}

/// One `[[bindings]]` entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Event name, e.g. `"buttonpressed"`
    pub event: String,
    /// Action name, e.g. `"log"`
    pub action: String,
}

/// Registers every binding in order.
///
/// Both names are checked before anything is registered for that binding;
/// the first bad entry aborts with `InvalidEventKind` or `InvalidListener`.
pub fn apply_bindings(
    device: &mut GamepadDevice,
    bindings: &[Binding],
) -> Result<Vec<ListenerId>, GamepadError> {
    let mut ids = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let kind: EventKind = binding.event.parse()?;
        let action: ListenerAction = binding.action.parse()?;
        debug!("Binding {} -> {:?}", kind, action);
        ids.push(device.on_kind(kind, action.into_listener()));
    }
    Ok(ids)
}
