//! # Bit-Level Transceiver
//!
//! Full-duplex byte exchange over the clocked serial link.
//!
//! Every clock cycle drives one command bit and samples one data bit:
//!
//! ```text
//! command  ──X── bit n ─────────────X── bit n+1
//! clock    ‾‾‾‾\___________/‾‾‾‾‾‾‾‾‾\______
//!               |<- half ->|<- half ->|
//!                      ^ sample data
//! ```
//!
//! No logging happens here; any output inside the loop would stretch the clock.

use crate::line::{Level, LineDriver, LineError};

/// Exchange one byte, least-significant bit first
///
/// Always clocks all 8 bits; the sampled byte is returned uninterpreted.
///
/// # Arguments
///
/// * `lines` - Line driver owning the four signal lines
/// * `out` - Byte driven on the command line
/// * `half_period_us` - Clock half-period in microseconds
///
/// # Errors
///
/// Returns the first `LineError` reported by the driver; the exchange stops
/// at that bit.
pub fn exchange_byte<L: LineDriver + ?Sized>(
    lines: &mut L,
    out: u8,
    half_period_us: u32,
) -> Result<u8, LineError> {
    let mut received = 0u8;

    for bit in 0..8 {
        lines.set_command(Level::from_bit(out & (1 << bit) != 0))?;
        lines.set_clock(Level::Low)?;
        lines.wait(half_period_us);

        if lines.read_data()?.is_high() {
            received |= 1 << bit;
        }

        lines.set_clock(Level::High)?;
        lines.wait(half_period_us);
    }

    Ok(received)
}
