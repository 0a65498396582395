//! # PSX Pad
//!
//! Poll a PlayStation controller wired to Raspberry Pi GPIO pins.
//!
//! This application drives the controller's synchronous serial link at a
//! fixed rate, logs decoded states, and optionally records them to JSONL.

use anyhow::{Context, Result};
use std::future::Future;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use psx_pad::config::{Config, LoggingConfig};
use psx_pad::controller::{LogTrace, PsxController};
use psx_pad::error::PsxError;
use psx_pad::line::GpioLines;
use psx_pad::telemetry::StateLogger;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Rolling log file name prefix
const LOG_FILE_NAME: &str = "psx-pad.log";

/// Poll outcome counters for status logging
#[derive(Debug, Default)]
struct PollStats {
    polls: u64,
    ok: u64,
    mismatches: u64,
}

impl PollStats {
    fn success_rate(&self) -> f64 {
        if self.polls == 0 {
            0.0
        } else {
            self.ok as f64 * 100.0 / self.polls as f64
        }
    }
}

/// Poll period for a rate in Hz
fn poll_period(rate_hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)))
}

/// Set up console logging, plus a daily rolling file when configured
///
/// `RUST_LOG` overrides the configured level. The returned guard must live
/// until exit so buffered file output is flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = if config.file_dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&config.file_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Run `on_tick` at every interval tick until `shutdown` resolves
///
/// The shutdown future is created once and polled across ticks, so a signal
/// that arrives while `on_tick` blocks is seen on the next iteration. Shutdown
/// wins over a pending tick.
async fn run_until<S, F>(mut ticks: Interval, shutdown: S, mut on_tick: F) -> Result<()>
where
    S: Future,
    F: FnMut() -> Result<()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => return Ok(()),
            _ = ticks.tick() => on_tick()?,
        }
    }
}

/// Main entry point for PSX Pad
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging
///    - Open GPIO and claim the four controller lines
///
/// 2. **Main Loop**
///    - Poll the controller at `rate_hz`
///    - Record each decoded state when telemetry is enabled
///    - Log status every `log_interval_polls` polls
///    - Handle Ctrl+C for graceful shutdown
///
/// Handshake mismatches are logged and polling continues; a line fault
/// stops the program.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("PSX Pad v{} starting...", env!("CARGO_PKG_VERSION"));

    let lines = GpioLines::open()?;
    let mut controller = PsxController::from_config(lines, &config)?.with_trace(LogTrace);

    let mut state_logger = if config.telemetry.enabled {
        Some(StateLogger::from_config(&config.telemetry)?)
    } else {
        None
    };

    let mut poll_interval = interval(poll_period(config.polling.rate_hz));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Polling controller at {}Hz", config.polling.rate_hz);
    info!("Press Ctrl+C to exit");

    let mut stats = PollStats::default();

    run_until(poll_interval, tokio::signal::ctrl_c(), || {
        stats.polls += 1;

        // The poll busy-waits on the clock; keep it off the async workers
        match tokio::task::block_in_place(|| controller.poll()) {
            Ok(state) => {
                stats.ok += 1;

                if let Some(state_logger) = state_logger.as_mut() {
                    let controller_type = controller.controller_type();
                    if let Err(e) = state_logger.record(stats.polls, controller_type, &state) {
                        warn!("Failed to record telemetry: {}", e);
                    }
                }
            }
            Err(PsxError::HandshakeMismatch {
                attempts,
                last_marker,
            }) => {
                stats.mismatches += 1;
                warn!(
                    "No controller response after {} attempts (last byte 0x{:02X})",
                    attempts, last_marker
                );
            }
            Err(e) => {
                error!("Polling stopped: {}", e);
                return Err(e.into());
            }
        }

        if stats.polls % config.polling.log_interval_polls == 0 {
            info!(
                "Polled {} times ({:.1}% ok, {} handshake mismatches)",
                stats.polls,
                stats.success_rate(),
                stats.mismatches
            );
        }

        Ok(())
    })
    .await?;

    info!("Received Ctrl+C, shutting down...");
    info!("Total polls: {} ({} ok)", stats.polls, stats.ok);

    Ok(())
}
