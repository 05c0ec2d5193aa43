//! padwatch - polls a gamepad, diffs its state between polls and raises
//! discrete button and axis events.
//!
//! ```rust,no_run
//! use padwatch::gamepad::{Dispatch, GamepadDevice, GamepadEvent, GilrsSource, PollSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut device = GamepadDevice::open(GilrsSource::new()?, 0)?;
//! device.on("buttonpressed", |event: &GamepadEvent| {
//!     println!("fire! button {}", event.id);
//!     Dispatch::Continue
//! })?;
//!
//! let poller = device.spawn(PollSettings::default());
//! let x = poller.state().axis(0);
//! # let _ = x;
//! let _device = poller.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod bindings;
pub mod config;
pub mod gamepad;

pub use bindings::{apply_bindings, Binding, ListenerAction};
pub use config::{ConfigError, PadConfig};
pub use gamepad::*;
