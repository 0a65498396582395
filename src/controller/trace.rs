//! # Trace Hook
//!
//! Opt-in observation of the poll pipeline.
//!
//! Hooks run only between transactions (attention released), never inside
//! the bit-exchange loop, so attaching one cannot stretch the clock.

use tracing::{debug, trace};

use super::state::ControllerState;
use crate::psx::protocol::RawFrame;

/// Callbacks fired during a poll
///
/// All methods default to doing nothing.
pub trait TraceHook {
    /// A handshake attempt read `marker` instead of 0x5A
    fn on_marker_mismatch(&mut self, _attempt: u32, _marker: u8) {}

    /// A frame was captured
    fn on_frame(&mut self, _controller_type: u8, _frame: &RawFrame, _attempts: u32) {}

    /// A frame was decoded
    fn on_state(&mut self, _state: &ControllerState) {}
}

/// Hook that ignores everything (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceHook for NoTrace {}

/// Hook that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTrace;

impl TraceHook for LogTrace {
    fn on_marker_mismatch(&mut self, attempt: u32, marker: u8) {
        debug!("Handshake attempt {} read 0x{:02X}, expected 0x5A", attempt, marker);
    }

    fn on_frame(&mut self, controller_type: u8, frame: &RawFrame, attempts: u32) {
        trace!(
            "Frame {:02X?} (controller type 0x{:02X}, {} attempt(s))",
            frame.bytes(),
            controller_type,
            attempts
        );
    }

    fn on_state(&mut self, state: &ControllerState) {
        trace!("Decoded state: {:?}", state);
    }
}
