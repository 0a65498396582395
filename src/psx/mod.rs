//! # PSX Protocol Module
//!
//! Implementation of the PlayStation controller polling protocol.
//!
//! This module handles:
//! - Protocol constants and button masks
//! - Full-duplex bit exchange over the clocked serial link
//! - The poll handshake with bounded retry
//! - Frame decoding (bit-order correction, active-low inversion, signed axes)
//! - Dead-zone filtering of the analog axes

pub mod protocol;
pub mod transceiver;
pub mod handshake;
pub mod decoder;
pub mod deadzone;
