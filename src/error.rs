//! # Error Types
//!
//! Custom error types for PSX Pad using `thiserror`.

use thiserror::Error;

use crate::line::LineError;
use crate::psx::handshake::HandshakeStage;

/// Main error type for PSX Pad
#[derive(Debug, Error)]
pub enum PsxError {
    /// The controller never answered with the handshake marker within the retry bound
    #[error("handshake mismatch after {attempts} attempts (last commencing byte 0x{last_marker:02X})")]
    HandshakeMismatch {
        /// Number of complete handshake attempts made
        attempts: u32,
        /// Commencing-data byte seen on the final attempt
        last_marker: u8,
    },

    /// Bad session arguments, rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A signal line reported an I/O failure
    #[error("Line fault during {stage:?}: {source}")]
    LineFault {
        /// Handshake stage in which the fault occurred
        stage: HandshakeStage,
        /// Failure reported by the line driver
        #[source]
        source: LineError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telemetry serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for PSX Pad
pub type Result<T> = std::result::Result<T, PsxError>;
