//! Error definitions for the gamepad module

use thiserror::Error;

/// Errors raised while opening, polling or subscribing to a gamepad
#[derive(Debug, Error)]
pub enum GamepadError {
    /// No native device is present at the requested index
    #[error("Could not find gamepad at index {index}")]
    DeviceNotFound { index: usize },

    /// Listener registration named an event kind that does not exist
    #[error("Unrecognized event kind: {0}")]
    InvalidEventKind(String),

    /// Listener registration named an action that does not exist
    #[error("Unrecognized listener: {0}")]
    InvalidListener(String),

    /// The native input backend could not be initialized
    #[error("Gamepad backend error: {0}")]
    Backend(String),

    /// A command was sent to a poll task that has already finished
    #[error("Poll task is no longer running")]
    PollerStopped,

    /// The poll task panicked or was aborted
    #[error("Poll task failed: {0}")]
    PollTask(String),
}
