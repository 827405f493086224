//! Stage transitions of a drip campaign.
//!
//! Campaign progress lives in the provider: every message carries its stage
//! index as a custom variable and the delivery webhook echoes it back. The
//! transition itself is a pure function of that index and the template count.

use serde_json::Value;

/// Returns the stage following `current`, or `None` once `current` is the last
/// template (or beyond it).
#[inline]
#[must_use]
pub fn next_stage(current: usize, template_count: usize) -> Option<usize> {
    let next = current.checked_add(1)?;
    (next < template_count).then_some(next)
}

/// Reads a stage marker echoed back by the provider.
///
/// Markers arrive either as JSON numbers or as numeric strings, and whole
/// floats such as `1.0` count as integers. Anything that is not a
/// non-negative whole number yields `None`.
#[must_use]
pub fn parse_stage_marker(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => match number.as_u64() {
            Some(stage) => usize::try_from(stage).ok(),
            None => number.as_f64().and_then(whole_stage),
        },
        Value::String(text) => {
            let text = text.trim();
            text.parse::<usize>().ok().or_else(|| text.parse::<f64>().ok().and_then(whole_stage))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn whole_stage(stage: f64) -> Option<usize> {
    (stage.is_finite() && stage >= 0.0 && stage.fract() == 0.0 && stage <= usize::MAX as f64)
        .then(|| stage as usize)
}
