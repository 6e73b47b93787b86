//! # psxpad
//!
//! Poll PlayStation pads wired to the Raspberry Pi SPI bus.
//!
//! Configures each pad (analog mode, motors), then polls every pad at a
//! fixed rate and logs the decoded key states.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use psxpad::bus::SpiBus;
use psxpad::config::Config;
use psxpad::pad::PadManager;
use psxpad::protocol::decoder::DeviceMode;

/// Main entry point for psxpad
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, defaults otherwise)
///    - Open and configure the SPI bus
///    - Run the analog-mode and motor-enable handshakes on every pad
///
/// 2. **Main Loop**
///    - Poll all pads every `interval_us`
///    - Decode and log each pad's key state
///    - Stop on Ctrl+C or on the first bus fault; other poll errors are logged
///
/// The bus is released when the pad manager drops, on every exit path.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("psxpad v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path))?,
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let bus = SpiBus::open(config.bus.bus, &config.bus.slave_selects)?;
    let mut pads = PadManager::open(bus, &config.bus.settings(), config.pads.count)?;

    for channel in pads.channels().collect::<Vec<_>>() {
        info!(
            "Configuring {}: analog={} lock={} motor1={} motor2={}",
            channel, config.pads.analog, config.pads.lock, config.pads.motor1, config.pads.motor2
        );
        pads.set_analog_mode(channel, config.pads.analog, config.pads.lock)?;
        pads.set_motor_enable(channel, config.pads.motor1, config.pads.motor2)?;
    }

    let mut poll_interval = interval(Duration::from_micros(config.poll.interval_us));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Polling {} pad(s) every {} us", pads.pad_count(), config.poll.interval_us);
    info!("Press Ctrl+C to exit");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // Main polling loop
    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                if let Err(e) = pads.poll_all() {
                    if e.is_fatal() {
                        error!("Polling stopped: {}", e);
                        return Err(e.into());
                    }
                    warn!("Poll cycle incomplete: {}", e);
                }

                for channel in pads.channels() {
                    let pad = pads.pad(channel)?;

                    if config.poll.dump_raw {
                        info!("{} raw: {:02X?}", channel, pad.last_response());
                    }

                    match pad.device_mode() {
                        DeviceMode::NotPresent => debug!("{}: no pad connected", channel),
                        _ => debug!("{}: {:?}", channel, pad.key_state()),
                    }
                }

                if pads.poll_count() % config.poll.status_interval_polls == 0 {
                    for channel in pads.channels() {
                        info!(
                            "Poll #{}: {} reports {:?}",
                            pads.poll_count(),
                            channel,
                            pads.pad(channel)?.device_mode()
                        );
                    }
                }
            }

            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total polls: {}", pads.poll_count());
                break;
            }
        }
    }

    Ok(())
}
