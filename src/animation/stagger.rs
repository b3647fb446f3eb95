use crate::foundation::error::{ScrubError, ScrubResult};

/// Order in which a group's start delays grow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerOrder {
    /// First target starts first.
    #[default]
    Forward,
    /// Last target starts first.
    Reverse,
    /// The middle target (lower middle for even counts) starts first, spreading outward.
    FromCenter,
    /// The given target starts first, spreading outward. Indices past the end clamp to the last.
    FromIndex(usize),
}

/// Stagger configuration for a group reveal.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stagger {
    /// Delay step between neighbouring targets, in seconds.
    pub base_delay: f64,
    /// Ordering policy.
    #[serde(default)]
    pub order: StaggerOrder,
}

impl Stagger {
    /// Build a stagger.
    pub fn new(base_delay: f64, order: StaggerOrder) -> Self {
        Self { base_delay, order }
    }

    /// Check that `base_delay` is finite and non-negative.
    pub fn validate(&self) -> ScrubResult<()> {
        if !self.base_delay.is_finite() || self.base_delay < 0.0 {
            return Err(ScrubError::config("stagger base_delay must be finite and >= 0"));
        }
        Ok(())
    }

    /// Start delays for `n` targets.
    pub fn schedule(&self, n: usize) -> Vec<f64> {
        schedule(n, self)
    }
}

/// Compute per-target start delays for `n` targets under `stagger`.
pub fn schedule(n: usize, stagger: &Stagger) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let base = stagger.base_delay;
    let last = n - 1;
    let from =
        |center: usize| -> Vec<f64> { (0..n).map(|i| i.abs_diff(center) as f64 * base).collect() };
    match stagger.order {
        StaggerOrder::Forward => (0..n).map(|i| i as f64 * base).collect(),
        StaggerOrder::Reverse => (0..n).map(|i| (last - i) as f64 * base).collect(),
        StaggerOrder::FromCenter => from(last / 2),
        StaggerOrder::FromIndex(k) => from(k.min(last)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/stagger.rs"]
mod tests;
