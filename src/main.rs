use color_eyre::{eyre::eyre, Result};
use padwatch::gamepad::{Dispatch, EventKind, GamepadDevice, GamepadEvent, GilrsSource};
use padwatch::{apply_bindings, PadConfig};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

// Standard-layout button ids used by the demo loop
const FIRE_BUTTON: usize = 0;
const RESTART_BUTTON: usize = 9;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = PadConfig::default_path()?;
    let config = PadConfig::load_or_create(&config_path)?;
    info!("Loaded config from {}: {:?}", config_path.display(), config);

    let source = GilrsSource::new()?;
    let mut device = GamepadDevice::open(source, config.device_index)
        .map_err(|e| eyre!("Failed to open gamepad: {}", e))?;

    apply_bindings(&mut device, &config.bindings)?;

    device.on_kind(EventKind::ButtonPressed, |event: &GamepadEvent| {
        match event.id {
            FIRE_BUTTON => info!("Fire"),
            RESTART_BUTTON => info!("Restart"),
            _ => return Dispatch::Continue,
        }
        Dispatch::StopDispatch
    });
    device.on_kind(EventKind::ButtonReleased, |event: &GamepadEvent| {
        debug!("Button {} released", event.id);
        Dispatch::Continue
    });

    let poller = device.spawn(config.poll_settings());
    let mut states = poller.subscribe();

    // Stand-in for the game loop: follow the horizontal stick until Ctrl-C
    info!("Watching gamepad {}, press Ctrl-C to quit", poller.index());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    warn!("Poll task ended");
                    break;
                }
                let x = states.borrow_and_update().axis(0);
                debug!("Horizontal movement: {:.1}", x);
            }
        }
    }

    let device = poller.stop().await?;
    info!("Final state of gamepad {}: {:?}", device.index(), device.state());
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = log_level(std::env::var("RUST_LOG").ok().as_deref());
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

// RUST_LOG holds a single level name here, anything else falls back to info
fn log_level(value: Option<&str>) -> Level {
    value
        .and_then(|name| name.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_picks_the_level() {
        assert_eq!(log_level(Some("debug")), Level::DEBUG);
        assert_eq!(log_level(Some("TRACE")), Level::TRACE);
        assert_eq!(log_level(Some("warn")), Level::WARN);
    }

    #[test]
    fn unset_or_unknown_rust_log_means_info() {
        assert_eq!(log_level(None), Level::INFO);
        assert_eq!(log_level(Some("padwatch=debug")), Level::INFO);
    }
}
