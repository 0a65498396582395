//! # PSX Protocol Constants and Types
//!
//! Core protocol definitions for the PlayStation controller link.

use bitflags::bitflags;

/// Start command, first byte of every transaction
pub const PSX_CMD_START: u8 = 0x01;

/// Poll-request command; the controller answers with its type byte
pub const PSX_CMD_POLL: u8 = 0x42;

/// Filler command clocked out while reading response bytes
pub const PSX_CMD_FILLER: u8 = 0x00;

/// Commencing-data byte the controller returns when status data follows
pub const PSX_HANDSHAKE_MARKER: u8 = 0x5A;

/// Status frame length (2 button bytes + 4 axis bytes)
pub const PSX_FRAME_LEN: usize = 6;

/// Raw axis center value
pub const PSX_AXIS_CENTER: u8 = 128;

bitflags! {
    /// Button masks within frame byte 0 (after bit-order correction and inversion)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemButtons: u8 {
        const SELECT   = 0x01;
        const JOYRIGHT = 0x02;
        const JOYLEFT  = 0x04;
        const START    = 0x08;
        const UP       = 0x10;
        const RIGHT    = 0x20;
        const DOWN     = 0x40;
        const LEFT     = 0x80;
    }
}

bitflags! {
    /// Button masks within frame byte 1 (after bit-order correction and inversion)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ActionButtons: u8 {
        const L2       = 0x01;
        const R2       = 0x02;
        const L1       = 0x04;
        const R1       = 0x08;
        const TRIANGLE = 0x10;
        const CIRCLE   = 0x20;
        const CROSS    = 0x40;
        const SQUARE   = 0x80;
    }
}

/// Six status bytes exactly as sampled from the data line
///
/// Only produced after a valid handshake marker; consumed by the decoder.
/// Frames cannot be built outside the crate:
///
/// ```compile_fail
/// use psx_pad::psx::protocol::RawFrame;
///
/// let frame = RawFrame::new([0; 6]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; PSX_FRAME_LEN],
}

impl RawFrame {
    #[must_use]
    pub(crate) const fn new(bytes: [u8; PSX_FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Wire bytes, uncorrected
    #[must_use]
    pub const fn bytes(&self) -> &[u8; PSX_FRAME_LEN] {
        &self.bytes
    }

    #[must_use]
    pub const fn into_bytes(self) -> [u8; PSX_FRAME_LEN] {
        self.bytes
    }
}
