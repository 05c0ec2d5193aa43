//! Poller - recurring poll task for a [`GamepadDevice`]
//!
//! Drives [`GamepadDevice::poll`] on a fixed interval from a tokio task and
//! exposes the running loop through a [`PollerHandle`].
//!
//! # Lifecycle
//!
//! ```text
//! GamepadDevice ──spawn()──► PollerHandle ──stop()──► GamepadDevice
//!    (idle)                   (polling)                 (idle again)
//! ```
//!
//! The task exclusively owns the device while polling. Listener registration
//! is forwarded over a command channel and applied between ticks; the latest
//! snapshot is published on a watch channel whenever a tick changed it.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

use crate::gamepad::device::GamepadDevice;
use crate::gamepad::error::GamepadError;
use crate::gamepad::event::EventKind;
use crate::gamepad::listener::{Listener, ListenerId};
use crate::gamepad::state::GamepadState;

/// What the poll task does when the device disappears between ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisconnectPolicy {
    /// Log a warning, keep the last snapshot and try again next tick
    #[default]
    Skip,
    /// End the poll task with [`GamepadError::DeviceNotFound`]
    Fail,
}

/// Configuration for the poll task
///
/// # Examples
///
/// ```rust
/// use padwatch::gamepad::{DisconnectPolicy, PollSettings};
/// use std::time::Duration;
///
/// let settings = PollSettings {
///     interval: Duration::from_millis(16),
///     on_disconnect: DisconnectPolicy::Fail,
/// };
/// assert_eq!(PollSettings::default().interval, Duration::from_millis(50));
/// # let _ = settings;
/// ```
#[derive(Clone, Debug)]
pub struct PollSettings {
    /// Time between two poll ticks
    pub interval: Duration,

    /// Behavior when the device vanishes mid-session
    pub on_disconnect: DisconnectPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
            on_disconnect: DisconnectPolicy::Skip,
        }
    }
}

// Commands applied by the poll task between ticks
enum PollCommand {
    Register {
        kind: EventKind,
        listener: Box<dyn Listener>,
        reply: oneshot::Sender<ListenerId>,
    },
    Unregister {
        id: ListenerId,
        reply: oneshot::Sender<bool>,
    },
}

/// Handle for a running poll task
///
/// Dropping the handle cancels the task. Use [`PollerHandle::stop`] to cancel
/// and get the device back.
pub struct PollerHandle {
    index: usize,
    commands: mpsc::Sender<PollCommand>,
    state: watch::Receiver<GamepadState>,
    task: JoinHandle<Result<GamepadDevice, GamepadError>>,
    cancel_guard: DropGuard,
}

impl GamepadDevice {
    /// Starts polling this device on a tokio task.
    ///
    /// The first tick fires immediately, later ticks follow `settings.interval`.
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, settings: PollSettings) -> PollerHandle {
        info!(
            "Spawning poll task for gamepad {} with {:?}",
            self.index(),
            settings
        );

        let index = self.index();
        let (command_sender, command_receiver) = mpsc::channel(16);
        let (state_sender, state_receiver) = watch::channel(self.state().clone());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_poll_loop(
            self,
            settings,
            command_receiver,
            state_sender,
            cancel.clone(),
        ));
        debug!("Tokio task spawned with handle: {:?}", task);

        PollerHandle {
            index,
            commands: command_sender,
            state: state_receiver,
            task,
            cancel_guard: cancel.drop_guard(),
        }
    }
}

impl PollerHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Latest published snapshot
    pub fn state(&self) -> GamepadState {
        self.state.borrow().clone()
    }

    /// Receiver for snapshots, notified when a tick changes the state
    pub fn subscribe(&self) -> watch::Receiver<GamepadState> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Registers a listener on the running task.
    ///
    /// The event name is validated before anything is sent, so an unknown
    /// name fails with [`GamepadError::InvalidEventKind`] and registers nothing.
    pub async fn on(
        &self,
        kind: &str,
        listener: impl Listener + 'static,
    ) -> Result<ListenerId, GamepadError> {
        let kind: EventKind = kind.parse()?;
        self.on_kind(kind, listener).await
    }

    pub async fn on_kind(
        &self,
        kind: EventKind,
        listener: impl Listener + 'static,
    ) -> Result<ListenerId, GamepadError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(PollCommand::Register {
                kind,
                listener: Box::new(listener),
                reply,
            })
            .await
            .map_err(|_| GamepadError::PollerStopped)?;
        response.await.map_err(|_| GamepadError::PollerStopped)
    }

    pub async fn off(&self, id: ListenerId) -> Result<bool, GamepadError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(PollCommand::Unregister { id, reply })
            .await
            .map_err(|_| GamepadError::PollerStopped)?;
        response.await.map_err(|_| GamepadError::PollerStopped)
    }

    /// Cancels the poll task and waits for it to finish.
    ///
    /// Returns the device with its last snapshot and listeners, ready to be
    /// spawned again. If the task ended on its own with an error (see
    /// [`DisconnectPolicy::Fail`]) that error is returned instead.
    pub async fn stop(self) -> Result<GamepadDevice, GamepadError> {
        info!("Stopping poll task for gamepad {}", self.index);
        let PollerHandle {
            task,
            cancel_guard,
            ..
        } = self;
        drop(cancel_guard);

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Poll task terminated abnormally: {}", e);
                Err(GamepadError::PollTask(e.to_string()))
            }
        }
    }
}

fn apply_command(device: &mut GamepadDevice, command: PollCommand) {
    match command {
        PollCommand::Register {
            kind,
            listener,
            reply,
        } => {
            let id = device.add_boxed(kind, listener);
            // Caller may have given up waiting
            let _ = reply.send(id);
        }
        PollCommand::Unregister { id, reply } => {
            let removed = device.off(id);
            let _ = reply.send(removed);
        }
    }
}

async fn run_poll_loop(
    mut device: GamepadDevice,
    settings: PollSettings,
    mut commands: mpsc::Receiver<PollCommand>,
    state_sender: watch::Sender<GamepadState>,
    cancel: CancellationToken,
) -> Result<GamepadDevice, GamepadError> {
    info!(
        "Starting poll loop for gamepad {} with {}ms interval",
        device.index(),
        settings.interval.as_millis()
    );

    // interval() panics on a zero period
    let mut timer = interval(settings.interval.max(Duration::from_millis(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Stats for performance monitoring
    let mut cycles: u64 = 0;
    let mut total_events: u64 = 0;
    let mut skipped: u64 = 0;
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(30);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Cancellation requested for gamepad {}", device.index());
                break;
            }

            Some(command) = commands.recv() => {
                apply_command(&mut device, command);
            }

            // Cancellation is checked first, so a tick that is due when
            // stop() is requested never polls
            _ = timer.tick() => {
                match device.poll() {
                    Ok(raised) => {
                        total_events += raised as u64;
                        if raised > 0 {
                            debug!("Tick raised {} events", raised);
                        }
                    }
                    Err(GamepadError::DeviceNotFound { index }) => match settings.on_disconnect {
                        DisconnectPolicy::Skip => {
                            skipped += 1;
                            warn!("Gamepad {} not found, skipping tick", index);
                        }
                        DisconnectPolicy::Fail => {
                            error!("Gamepad {} disconnected, ending poll loop", index);
                            return Err(GamepadError::DeviceNotFound { index });
                        }
                    },
                    Err(e) => {
                        error!("Poll failed: {}", e);
                        return Err(e);
                    }
                }

                state_sender.send_if_modified(|published| {
                    if *published != *device.state() {
                        *published = device.state().clone();
                        true
                    } else {
                        false
                    }
                });
                cycles += 1;

                let now = Local::now();
                if now - last_stats_time > stats_interval {
                    let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
                    info!(
                        "Poller stats: {} cycles, {} events, {} skipped in {} seconds",
                        cycles, total_events, skipped, elapsed_seconds
                    );
                    cycles = 0;
                    total_events = 0;
                    skipped = 0;
                    last_stats_time = now;
                }
            }
        }
    }

    info!("Poll loop for gamepad {} stopped", device.index());
    Ok(device)
}
