//! Gamepad subsystem: polling, diffing and event dispatch
//!
//! Implements a three-stage cycle run once per poll tick:
//!
//! 1. [`source`] - read a snapshot from the native device
//! 2. [`state`] - diff it against the previous snapshot
//! 3. [`device`] - replace the stored snapshot and dispatch events to [`listener`]s
//!
//! [`poller`] runs the cycle on a tokio interval and manages its lifecycle.
//!
//! # Architecture
//!
//! ```text
//! GamepadSource ──► GamepadState ──► StateDiff ──► GamepadEvent ──► Listener
//!                   (snapshot)       (delta)       (per change)
//! ```

pub mod device;
pub mod error;
pub mod event;
pub mod listener;
pub mod poller;
pub mod source;
pub mod state;

pub use device::GamepadDevice;
pub use error::GamepadError;
pub use event::{EventKind, GamepadEvent};
pub use listener::{Dispatch, Listener, ListenerId, ListenerRegistry};
pub use poller::{DisconnectPolicy, PollSettings, PollerHandle};
pub use source::{read_state, GamepadSource, GilrsSource, RawReading, VirtualSource};
pub use state::{diff, round_to_tenth, GamepadState, StateDiff};
