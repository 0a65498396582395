//! Trait abstraction for the four PSX signal lines to enable testing

use std::fmt;
use thiserror::Error;

use crate::error::{PsxError, Result};

/// Logic level of a single signal line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Line pulled or driven low
    Low,
    /// Line pulled or driven high
    High,
}

impl Level {
    /// Level that carries `bit` on the wire
    #[must_use]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }

    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

/// The four lines of a PSX controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineId {
    /// Controller → host data (input)
    Data,
    /// Host → controller command (output)
    Command,
    /// Attention / select (output, active low)
    Attention,
    /// Clock (output, idles high)
    Clock,
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineId::Data => "data",
            LineId::Command => "command",
            LineId::Attention => "attention",
            LineId::Clock => "clock",
        };
        f.write_str(name)
    }
}

/// Physical line identifiers (GPIO numbers) for one controller session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub data: u8,
    pub command: u8,
    pub attention: u8,
    pub clock: u8,
}

impl PinAssignment {
    /// Identifier assigned to `line`
    #[must_use]
    pub const fn pin(&self, line: LineId) -> u8 {
        match line {
            LineId::Data => self.data,
            LineId::Command => self.command,
            LineId::Attention => self.attention,
            LineId::Clock => self.clock,
        }
    }

    /// Check that no two lines share an identifier
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first pair of lines that collide.
    pub fn validate(&self) -> Result<()> {
        const LINES: [LineId; 4] = [
            LineId::Data,
            LineId::Command,
            LineId::Attention,
            LineId::Clock,
        ];

        for (i, &a) in LINES.iter().enumerate() {
            for &b in &LINES[i + 1..] {
                if self.pin(a) == self.pin(b) {
                    return Err(PsxError::InvalidConfiguration(format!(
                        "{} and {} lines share identifier {}",
                        a,
                        b,
                        self.pin(a)
                    )));
                }
            }
        }

        Ok(())
    }
}

/// I/O failure reported by a line driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line} line: {reason}")]
pub struct LineError {
    pub line: LineId,
    pub reason: String,
}

impl LineError {
    pub fn new(line: LineId, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Trait for signal line I/O operations
///
/// Pure I/O: implementations never interpret the bits they move.
#[cfg_attr(test, mockall::automock)]
pub trait LineDriver {
    /// Claim the lines: data as input (idle-high pull), the rest as outputs
    fn configure(&mut self, pins: &PinAssignment) -> std::result::Result<(), LineError>;

    /// Drive the command line
    fn set_command(&mut self, level: Level) -> std::result::Result<(), LineError>;

    /// Drive the clock line
    fn set_clock(&mut self, level: Level) -> std::result::Result<(), LineError>;

    /// Drive the attention line
    fn set_attention(&mut self, level: Level) -> std::result::Result<(), LineError>;

    /// Sample the data line
    fn read_data(&mut self) -> std::result::Result<Level, LineError>;

    /// Hold for the given number of microseconds
    fn wait(&mut self, micros: u32);
}


#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;

    fn pins() -> PinAssignment {
        PinAssignment {
            data: 9,
            command: 10,
            attention: 8,
            clock: 11,
        }
    }

    #[test]
    fn test_level_from_bit() {
        assert_eq!(Level::from_bit(true), Level::High);
        assert_eq!(Level::from_bit(false), Level::Low);
        assert!(Level::High.is_high());
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn test_pin_lookup() {
        let pins = pins();
        assert_eq!(pins.pin(LineId::Data), 9);
        assert_eq!(pins.pin(LineId::Command), 10);
        assert_eq!(pins.pin(LineId::Attention), 8);
        assert_eq!(pins.pin(LineId::Clock), 11);
    }

    #[test]
    fn test_distinct_pins_are_valid() {
        assert!(pins().validate().is_ok());
    }

    #[test]
    fn test_shared_pin_is_rejected() {
        let mut pins = pins();
        pins.clock = pins.command;

        match pins.validate() {
            Err(PsxError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("command"));
                assert!(msg.contains("clock"));
            }
            other => panic!("Expected InvalidConfiguration, got: {:?}", other),
        }
    }

    #[test]
    fn test_line_error_display() {
        let err = LineError::new(LineId::Clock, "stuck");
        assert_eq!(err.to_string(), "clock line: stuck");
    }

    #[test]
    fn test_scripted_lines_play_back_lsb_first() {
        let mut lines = ScriptedLines::new();
        lines.queue_byte(0b0000_0101);

        assert_eq!(lines.read_data().unwrap(), Level::High);
        assert_eq!(lines.read_data().unwrap(), Level::Low);
        assert_eq!(lines.read_data().unwrap(), Level::High);
        for _ in 3..8 {
            assert_eq!(lines.read_data().unwrap(), Level::Low);
        }

        // Exhausted script reads as the idle-high data line
        assert_eq!(lines.read_data().unwrap(), Level::High);
    }

    #[test]
    fn test_scripted_lines_injected_failure() {
        let mut lines = ScriptedLines::new();
        lines.fail_read_at(1);

        assert!(lines.read_data().is_ok());
        let err = lines.read_data().unwrap_err();
        assert_eq!(err.line, LineId::Data);
        assert!(lines.read_data().is_ok());
    }

    #[test]
    fn test_transactions_group_command_bits() {
        let mut lines = ScriptedLines::new();

        lines.set_command(Level::Low).unwrap(); // outside any transaction
        lines.set_attention(Level::Low).unwrap();
        for bit in 0..8 {
            lines.set_command(Level::from_bit(0x42 & (1 << bit) != 0)).unwrap();
        }
        lines.set_attention(Level::High).unwrap();

        assert_eq!(lines.transactions(), vec![vec![0x42]]);
        assert_eq!(lines.attention(), Some(Level::High));
    }
}
