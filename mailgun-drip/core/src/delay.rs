//! Conversion of relative delays into provider delivery times.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Mailgun accepts scheduled deliveries at most three days ahead.
pub const MAX_DELIVERY_DELAY_SECS: u64 = 60 * 60 * 24 * 3;

/// Largest fractional delay accepted by [`parse_delay`], well inside the
/// range where `f64` holds whole seconds exactly.
const MAX_F64_DELAY: f64 = 1e15;

/// Returns `round(now) + delay` as a Unix timestamp string.
///
/// # Errors
///
/// Returns [`Error::DelayTooLarge`] when `delay` reaches the scheduling
/// horizon of [`MAX_DELIVERY_DELAY_SECS`]. The delay is rejected rather than
/// clamped.
pub fn compute_delivery_time(now: DateTime<Utc>, delay: u64) -> Result<String> {
    if delay >= MAX_DELIVERY_DELAY_SECS {
        return Err(Error::DelayTooLarge { delay, max: MAX_DELIVERY_DELAY_SECS });
    }

    // round half up to whole seconds
    let now_secs = (now.timestamp_millis() + 500).div_euclid(1000);

    Ok(now_secs.saturating_add_unsigned(delay).to_string())
}

/// Coerces a textual delay such as `"60"` or `"90.4"` into whole seconds.
///
/// # Errors
///
/// Returns [`Error::InvalidDelay`] for negative, non-finite or non-numeric
/// input.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_delay(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    if let Ok(delay) = trimmed.parse::<u64>() {
        return Ok(delay);
    }

    match trimmed.parse::<f64>() {
        Ok(delay) if delay.is_finite() && (0.0..=MAX_F64_DELAY).contains(&delay) => {
            Ok(delay.round() as u64)
        }
        _ => Err(Error::InvalidDelay { value: value.to_string() }),
    }
}
