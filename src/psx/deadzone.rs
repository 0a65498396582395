//! # Dead-zone Filter
//!
//! Centers analog readings that sit close to the electrical center.
//!
//! A stick at rest rarely reports exactly 128; the filter snaps every raw
//! axis byte inside the open band `(128 - r, 128 + r)` to 128, where
//! `r = ceil(255 × fraction)`. Values on or beyond the band edges pass
//! through unchanged, so there is no rescaling of the remaining range.
//!
//! ## Usage
//!
//! ```
//! use psx_pad::psx::deadzone::apply_deadzone;
//!
//! // 20% dead-zone: radius 51, centered band (77, 179)
//! assert_eq!(apply_deadzone(150, 0.2), 128);
//! assert_eq!(apply_deadzone(200, 0.2), 200);
//!
//! // No dead-zone: identity
//! assert_eq!(apply_deadzone(129, 0.0), 129);
//! ```

use super::protocol::PSX_AXIS_CENTER;

/// Full raw axis span used to scale the dead-zone fraction
const AXIS_SPAN: f64 = 255.0;

/// Dead-zone radius in raw axis units for a fraction in `[0.0, 1.0]`
///
/// Fractions outside the range are clamped; NaN yields 0.
///
/// # Examples
///
/// ```
/// use psx_pad::psx::deadzone::deadzone_radius;
///
/// assert_eq!(deadzone_radius(0.0), 0);
/// assert_eq!(deadzone_radius(0.2), 51);
/// assert_eq!(deadzone_radius(1.0), 255);
/// ```
#[must_use]
pub fn deadzone_radius(fraction: f64) -> u8 {
    (AXIS_SPAN * fraction.clamp(0.0, 1.0)).ceil() as u8
}

/// Apply the dead-zone to one raw (bit-order corrected) axis byte
///
/// Must run before the signed conversion.
#[must_use]
pub fn apply_deadzone(raw: u8, fraction: f64) -> u8 {
    let radius = i16::from(deadzone_radius(fraction));
    let center = i16::from(PSX_AXIS_CENTER);
    let value = i16::from(raw);

    if value > center - radius && value < center + radius {
        PSX_AXIS_CENTER
    } else {
        raw
    }
}
