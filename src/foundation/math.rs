/// Clamp into `[0, 1]`, mapping NaN to `0`.
pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// `v` when finite, otherwise `fallback`.
pub(crate) fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

/// Sanitize a frame delta: non-finite or negative deltas count as zero, large ones are capped.
pub(crate) fn frame_delta(dt: f64, max: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max)
}

pub(crate) fn ensure_finite(name: &str, v: f64) -> crate::ScrubResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(crate::ScrubError::config(format!("{name} must be finite")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
