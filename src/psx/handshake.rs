//! # Handshake Controller
//!
//! Runs the fixed command sequence of one poll and owns the retry policy.
//!
//! ## Sequence
//!
//! ```text
//! attention low
//! exchange 0x01 → (ignored)
//! exchange 0x42 → controller type
//! exchange 0x00 → commencing byte, must be 0x5A
//! exchange 0x00 × 6 → raw frame
//! attention high
//! ```
//!
//! A wrong commencing byte releases attention, waits the settle interval and
//! starts over, at most `max_retries` more times. Line faults are never
//! retried.

use tracing::debug;

use super::protocol::*;
use super::transceiver::exchange_byte;
use crate::error::{PsxError, Result};
use crate::line::{Level, LineDriver, LineError};

/// Position in the handshake state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Idle,
    AttentionAsserted,
    StartSent,
    /// Poll request sent, controller type captured
    PollSent,
    /// Commencing byte read
    MarkerRead,
    FrameCapture,
    /// Marker mismatch, attempt abandoned
    Retry,
}

/// Timing and retry bound for the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeTiming {
    /// Clock half-period in microseconds
    pub half_period_us: u32,
    /// Pause between a failed attempt and the next one
    pub settle_us: u32,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for HandshakeTiming {
    fn default() -> Self {
        Self {
            half_period_us: 10,
            settle_us: 100,
            max_retries: 3,
        }
    }
}

impl HandshakeTiming {
    /// Total attempts allowed per poll
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Output of a successful handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    /// Response to the poll request (informational)
    pub controller_type: u8,
    pub frame: RawFrame,
    /// Attempts used, 1 when the first handshake succeeded
    pub attempts: u32,
}

enum Attempt {
    Frame { controller_type: u8, frame: RawFrame },
    Mismatch { marker: u8 },
}

/// One attention-low window
struct Transaction<'a, L: ?Sized> {
    lines: &'a mut L,
    half_period_us: u32,
    stage: HandshakeStage,
}

impl<'a, L: LineDriver + ?Sized> Transaction<'a, L> {
    fn new(lines: &'a mut L, half_period_us: u32) -> Self {
        Self {
            lines,
            half_period_us,
            stage: HandshakeStage::Idle,
        }
    }

    fn exchange(&mut self, out: u8) -> std::result::Result<u8, LineError> {
        exchange_byte(&mut *self.lines, out, self.half_period_us)
    }

    fn run(&mut self) -> std::result::Result<Attempt, LineError> {
        self.lines.set_attention(Level::Low)?;
        self.stage = HandshakeStage::AttentionAsserted;

        self.exchange(PSX_CMD_START)?;
        self.stage = HandshakeStage::StartSent;

        let controller_type = self.exchange(PSX_CMD_POLL)?;
        self.stage = HandshakeStage::PollSent;

        let marker = self.exchange(PSX_CMD_FILLER)?;
        self.stage = HandshakeStage::MarkerRead;

        if marker != PSX_HANDSHAKE_MARKER {
            self.stage = HandshakeStage::Retry;
            return Ok(Attempt::Mismatch { marker });
        }

        self.stage = HandshakeStage::FrameCapture;
        let mut bytes = [0u8; PSX_FRAME_LEN];
        for byte in &mut bytes {
            *byte = self.exchange(PSX_CMD_FILLER)?;
        }

        Ok(Attempt::Frame {
            controller_type,
            frame: RawFrame::new(bytes),
        })
    }
}

/// Run the handshake until a frame is captured or the retry bound is hit
///
/// Attention is released at the end of every attempt, whatever the outcome.
/// `on_mismatch` receives the attempt number and the byte read in place of
/// the marker, and is only called with attention released.
///
/// # Errors
///
/// - `HandshakeMismatch`: no attempt saw the 0x5A marker
/// - `LineFault`: the driver failed; returned at once without retry
pub fn run_handshake<L, F>(
    lines: &mut L,
    timing: &HandshakeTiming,
    mut on_mismatch: F,
) -> Result<Capture>
where
    L: LineDriver + ?Sized,
    F: FnMut(u32, u8),
{
    let max_attempts = timing.max_attempts();
    let mut last_marker = 0;

    for attempt in 1..=max_attempts {
        let mut transaction = Transaction::new(&mut *lines, timing.half_period_us);
        let outcome = transaction.run();
        let stage = transaction.stage;

        let released = lines.set_attention(Level::High);

        let outcome = match (outcome, released) {
            (Err(source), released) => {
                if let Err(e) = released {
                    debug!("Could not release attention after line fault: {}", e);
                }
                return Err(PsxError::LineFault { stage, source });
            }
            (Ok(_), Err(source)) => return Err(PsxError::LineFault { stage, source }),
            (Ok(outcome), Ok(())) => outcome,
        };

        match outcome {
            Attempt::Frame {
                controller_type,
                frame,
            } => {
                return Ok(Capture {
                    controller_type,
                    frame,
                    attempts: attempt,
                });
            }
            Attempt::Mismatch { marker } => {
                last_marker = marker;
                on_mismatch(attempt, marker);

                if attempt < max_attempts {
                    lines.wait(timing.settle_us);
                }
            }
        }
    }

    Err(PsxError::HandshakeMismatch {
        attempts: max_attempts,
        last_marker,
    })
}
