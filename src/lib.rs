//! # PSX Pad Library
//!
//! Poll a PlayStation (DualShock-style) controller over its synchronous serial link.
//!
//! This library provides the protocol engine that bit-bangs the controller's
//! command, data, clock and attention lines, validates the poll handshake and
//! decodes the six-byte status frame into buttons and analog axes.

pub mod config;
pub mod error;
pub mod line;
pub mod psx;
pub mod controller;
pub mod telemetry;
