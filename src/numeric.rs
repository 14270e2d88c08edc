//! Numeric conversion helpers used across the project.
//!
//! These utilities guard conversions between floating-point and integer
//! domains so voxel lookups never wrap on pathological coordinates.

use std::time::Duration;

/// Floor a coordinate and clamp it into the `i32` domain.
///
/// Non-finite input maps to zero rather than poisoning a block lookup.
///
/// # Examples
/// ```
/// use softfall::numeric::floor_to_i32;
/// assert_eq!(floor_to_i32(-0.2), -1);
/// assert_eq!(floor_to_i32(3.9), 3);
/// assert_eq!(floor_to_i32(f64::NAN), 0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn floor_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let floored = value.floor();
    let clamped = floored.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
    clamped as i32
}

/// Round a non-negative tick estimate up into `u32`, saturating at the bounds.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The value is clamped into the u32 domain before casting."
)]
#[must_use]
pub fn ceil_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.ceil().min(f64::from(u32::MAX)) as u32
}

/// Convert a [`Duration`] into whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
