//! # Line Driver Module
//!
//! Access to the four signal lines of a PSX controller port.
//!
//! This module handles:
//! - The `LineDriver` capability trait the protocol engine is written against
//! - A Raspberry Pi GPIO binding (`GpioLines`) via `rppal`
//!
//! ## Wiring
//!
//! | Line | Direction | Idle level |
//! |------|-----------|------------|
//! | Data | input (pull-up) | high |
//! | Command | output | low |
//! | Attention | output | high |
//! | Clock | output | high |

pub mod driver;

pub use driver::{Level, LineDriver, LineError, LineId, PinAssignment};

use rppal::gpio::{self, Gpio, InputPin, OutputPin};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{PsxError, Result};

/// GPIO pins claimed by `configure`
struct ClaimedPins {
    data: InputPin,
    command: OutputPin,
    attention: OutputPin,
    clock: OutputPin,
}

/// Raspberry Pi GPIO line driver
///
/// Holds the GPIO peripheral and, once configured, the four claimed pins.
/// Pins are returned to their original state when the driver is dropped.
pub struct GpioLines {
    gpio: Gpio,
    pins: Option<ClaimedPins>,
}

impl GpioLines {
    /// Open the GPIO peripheral
    ///
    /// # Errors
    ///
    /// Returns `Io` if `/dev/gpiomem` cannot be opened (not a Raspberry Pi,
    /// or missing permissions).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use psx_pad::line::GpioLines;
    ///
    /// let lines = GpioLines::open()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| {
            PsxError::Io(std::io::Error::other(format!("Failed to open GPIO: {}", e)))
        })?;

        info!("Opened GPIO peripheral");
        Ok(Self { gpio, pins: None })
    }

    fn claimed(&mut self, line: LineId) -> std::result::Result<&mut ClaimedPins, LineError> {
        self.pins
            .as_mut()
            .ok_or_else(|| LineError::new(line, "line not configured"))
    }

    fn claim(
        &self,
        pins: &PinAssignment,
        line: LineId,
    ) -> std::result::Result<gpio::Pin, LineError> {
        let number = pins.pin(line);
        self.gpio
            .get(number)
            .map_err(|e| LineError::new(line, format!("failed to claim GPIO {}: {}", number, e)))
    }
}

fn gpio_level(level: Level) -> gpio::Level {
    match level {
        Level::Low => gpio::Level::Low,
        Level::High => gpio::Level::High,
    }
}

impl LineDriver for GpioLines {
    fn configure(&mut self, pins: &PinAssignment) -> std::result::Result<(), LineError> {
        let data = self.claim(pins, LineId::Data)?.into_input_pullup();
        let command = self.claim(pins, LineId::Command)?.into_output_low();
        let attention = self.claim(pins, LineId::Attention)?.into_output_high();
        let clock = self.claim(pins, LineId::Clock)?.into_output_high();

        debug!(
            "Claimed GPIO lines: data={} command={} attention={} clock={}",
            pins.data, pins.command, pins.attention, pins.clock
        );

        self.pins = Some(ClaimedPins {
            data,
            command,
            attention,
            clock,
        });
        Ok(())
    }

    fn set_command(&mut self, level: Level) -> std::result::Result<(), LineError> {
        self.claimed(LineId::Command)?.command.write(gpio_level(level));
        Ok(())
    }

    fn set_clock(&mut self, level: Level) -> std::result::Result<(), LineError> {
        self.claimed(LineId::Clock)?.clock.write(gpio_level(level));
        Ok(())
    }

    fn set_attention(&mut self, level: Level) -> std::result::Result<(), LineError> {
        self.claimed(LineId::Attention)?.attention.write(gpio_level(level));
        Ok(())
    }

    fn read_data(&mut self) -> std::result::Result<Level, LineError> {
        let pins = self.claimed(LineId::Data)?;
        Ok(Level::from_bit(pins.data.is_high()))
    }

    /// Busy-waits; sleeping would overshoot microsecond half-periods
    fn wait(&mut self, micros: u32) {
        let deadline = Instant::now() + Duration::from_micros(u64::from(micros));
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpio_level_mapping() {
        assert_eq!(gpio_level(Level::Low), gpio::Level::Low);
        assert_eq!(gpio_level(Level::High), gpio::Level::High);
    }

    // Integration test - only runs on a Raspberry Pi
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_configure_with_real_hardware() {
        let mut lines = GpioLines::open().expect("GPIO not available");
        let pins = PinAssignment {
            data: 9,
            command: 10,
            attention: 8,
            clock: 11,
        };

        assert!(lines.configure(&pins).is_ok());
        assert!(lines.set_attention(Level::High).is_ok());
        assert!(lines.read_data().is_ok());
    }

    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_unconfigured_lines_report_fault() {
        let mut lines = GpioLines::open().expect("GPIO not available");

        let err = lines.set_clock(Level::High).unwrap_err();
        assert_eq!(err.line, LineId::Clock);
        assert!(err.reason.contains("not configured"));
    }
}
