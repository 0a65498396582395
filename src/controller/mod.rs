//! # Controller Module
//!
//! A polling session against one PSX controller.
//!
//! This module handles:
//! - Validating the session configuration and claiming the lines
//! - Running the handshake and decoding each frame into a [`ControllerState`]
//! - Optional tracing of the poll pipeline
//!
//! ## Usage
//!
//! ```no_run
//! use psx_pad::controller::PsxController;
//! use psx_pad::line::{GpioLines, PinAssignment};
//!
//! let pins = PinAssignment { data: 9, command: 10, attention: 8, clock: 11 };
//! let mut controller = PsxController::new(GpioLines::open()?, pins, 0.1)?;
//!
//! let state = controller.poll()?;
//! println!("cross pressed: {}", state.buttons().cross);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Thread Safety
//!
//! `poll` takes `&mut self`, so one session never runs two polls at once.
//! Share a session between threads by wrapping it in a `Mutex`.

pub mod state;
pub mod trace;

pub use state::{Buttons, ControllerState};
pub use trace::{LogTrace, NoTrace, TraceHook};

use tracing::info;

use crate::config::Config;
use crate::error::{PsxError, Result};
use crate::line::{Level, LineDriver, LineError, PinAssignment};
use crate::psx::decoder::decode_frame;
use crate::psx::handshake::{run_handshake, HandshakeStage, HandshakeTiming};

/// Session configuration, fixed for the controller's lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub pins: PinAssignment,
    /// Dead-zone fraction (0.0 to 1.0)
    pub deadzone: f64,
    pub timing: HandshakeTiming,
}

impl SessionConfig {
    /// Session with default timing
    #[must_use]
    pub fn new(pins: PinAssignment, deadzone: f64) -> Self {
        Self {
            pins,
            deadzone,
            timing: HandshakeTiming::default(),
        }
    }

    /// Session described by a loaded configuration file
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            pins: config.pins.assignment(),
            deadzone: config.controller.deadzone,
            timing: HandshakeTiming {
                half_period_us: config.controller.half_period_us,
                settle_us: config.controller.settle_us,
                max_retries: config.controller.max_retries,
            },
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if lines share an identifier, the
    /// dead-zone is outside `[0.0, 1.0]`, or the half-period is zero.
    pub fn validate(&self) -> Result<()> {
        self.pins.validate()?;

        if !(0.0..=1.0).contains(&self.deadzone) {
            return Err(PsxError::InvalidConfiguration(format!(
                "deadzone {} is outside 0.0..=1.0",
                self.deadzone
            )));
        }

        if self.timing.half_period_us == 0 {
            return Err(PsxError::InvalidConfiguration(
                "clock half-period must be at least 1us".to_string(),
            ));
        }

        Ok(())
    }
}

/// PSX controller polling session
///
/// Owns the line driver exclusively for its whole lifetime.
pub struct PsxController<L: LineDriver, T: TraceHook = NoTrace> {
    lines: L,
    session: SessionConfig,
    trace: T,
    controller_type: Option<u8>,
}

impl<L: LineDriver> PsxController<L> {
    /// Create a session with default timing
    ///
    /// # Arguments
    ///
    /// * `lines` - Line driver for the four signal lines
    /// * `pins` - Line identifiers (data, command, attention, clock)
    /// * `deadzone` - Dead-zone fraction (0.0 to 1.0); 0.0 disables it
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration`: bad pins or dead-zone
    /// - `LineFault`: the driver could not claim or drive the lines
    pub fn new(lines: L, pins: PinAssignment, deadzone: f64) -> Result<Self> {
        Self::with_session(lines, SessionConfig::new(pins, deadzone))
    }

    /// Create a session from a loaded configuration file
    ///
    /// # Errors
    ///
    /// Same as [`PsxController::with_session`].
    pub fn from_config(lines: L, config: &Config) -> Result<Self> {
        Self::with_session(lines, SessionConfig::from_config(config))
    }

    /// Create a session with explicit timing
    ///
    /// Configures line directions, then drives the idle levels:
    /// command low, attention high, clock high.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration`: the session fails validation (nothing is
    ///   driven in that case)
    /// - `LineFault`: the driver could not claim or drive the lines
    pub fn with_session(mut lines: L, session: SessionConfig) -> Result<Self> {
        session.validate()?;

        let fault = |source: LineError| PsxError::LineFault {
            stage: HandshakeStage::Idle,
            source,
        };

        lines.configure(&session.pins).map_err(fault)?;
        lines.set_command(Level::Low).map_err(fault)?;
        lines.set_attention(Level::High).map_err(fault)?;
        lines.set_clock(Level::High).map_err(fault)?;

        info!(
            "PSX controller ready (data={}, command={}, attention={}, clock={}, deadzone={})",
            session.pins.data,
            session.pins.command,
            session.pins.attention,
            session.pins.clock,
            session.deadzone
        );

        Ok(Self {
            lines,
            session,
            trace: NoTrace,
            controller_type: None,
        })
    }
}

impl<L: LineDriver, T: TraceHook> PsxController<L, T> {
    /// Replace the trace hook
    #[must_use]
    pub fn with_trace<U: TraceHook>(self, hook: U) -> PsxController<L, U> {
        PsxController {
            lines: self.lines,
            session: self.session,
            trace: hook,
            controller_type: self.controller_type,
        }
    }

    /// Poll the controller once
    ///
    /// Runs the handshake (with bounded retry), then decodes the frame.
    ///
    /// # Errors
    ///
    /// - `HandshakeMismatch`: the marker never appeared within the retry bound
    /// - `LineFault`: the line driver failed
    pub fn poll(&mut self) -> Result<ControllerState> {
        let trace = &mut self.trace;
        let capture = run_handshake(&mut self.lines, &self.session.timing, |attempt, marker| {
            trace.on_marker_mismatch(attempt, marker);
        })?;

        self.trace
            .on_frame(capture.controller_type, &capture.frame, capture.attempts);
        self.controller_type = Some(capture.controller_type);

        let state = decode_frame(capture.frame, self.session.deadzone);
        self.trace.on_state(&state);

        Ok(state)
    }

    /// Controller-type byte from the last successful poll
    #[must_use]
    pub fn controller_type(&self) -> Option<u8> {
        self.controller_type
    }

    #[must_use]
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    #[must_use]
    pub fn trace(&self) -> &T {
        &self.trace
    }

    /// Release the line driver
    pub fn into_lines(self) -> L {
        self.lines
    }
}
