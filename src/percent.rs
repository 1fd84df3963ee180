//! Percentage deltas between a baseline and a latest value.
//!
//! The text form is shared by every report column, so historical reports stay
//! comparable: sign as a literal `-`, magnitude biased by `0.005` and then
//! truncated to two decimals.

use thiserror::Error;

/// Placeholder for a delta that cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

const ROUNDING_BIAS: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PercentageError {
    #[error("baseline value is zero")]
    ZeroBaseline,
    #[error("delta is not finite (baseline={baseline}, latest={latest})")]
    NonFinite { baseline: f64, latest: f64 },
}

/// Relative change from `baseline` to `latest`, in percent.
///
/// Non-finite inputs, and tiny baselines whose delta overflows, are `NonFinite`.
pub fn percentage_delta(baseline: f64, latest: f64) -> Result<f64, PercentageError> {
    if !baseline.is_finite() || !latest.is_finite() {
        return Err(PercentageError::NonFinite { baseline, latest });
    }
    if baseline == 0.0 {
        return Err(PercentageError::ZeroBaseline);
    }
    let delta = (latest - baseline) / baseline * 100.0;
    if !delta.is_finite() {
        return Err(PercentageError::NonFinite { baseline, latest });
    }
    Ok(delta)
}

/// Formats the delta from `baseline` to `latest`, e.g. `"5.15%"` or `"-8.33%"`.
pub fn format_percentage(baseline: f64, latest: f64) -> Result<String, PercentageError> {
    percentage_delta(baseline, latest).map(format_delta)
}

/// Formats an already computed percentage.
pub fn format_delta(delta: f64) -> String {
    let (sign, magnitude) = if delta < 0.0 {
        ("-", -delta)
    } else {
        ("", delta)
    };

    let biased = magnitude + ROUNDING_BIAS;
    let integer = biased.trunc();
    let fraction = ((biased - integer) * 100.0) as u32;
    format!("{sign}{}.{fraction:02}%", integer as u64)
}

/// Like [`format_percentage`], with [`NOT_AVAILABLE`] for undefined deltas.
pub fn format_or_placeholder(baseline: f64, latest: f64) -> String {
    format_percentage(baseline, latest).unwrap_or_else(|_| NOT_AVAILABLE.to_string())
}
