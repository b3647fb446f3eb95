use crate::foundation::error::{ScrubError, ScrubResult};

pub use kurbo::{Rect, Vec2};

/// Monotonic 0-based frame tick counter of one [`crate::FrameLoop`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The index following this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifier of an element registered with a [`crate::ProgressTracker`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackerId(pub u64);

/// Direction of scroll travel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Offsets increasing (scrolling down the document).
    #[default]
    Forward,
    /// Offsets decreasing.
    Backward,
}

impl Direction {
    /// Resolve the direction implied by `delta`, keeping `previous` when nothing moved.
    pub fn from_delta(delta: f64, previous: Self) -> Self {
        if delta > 0.0 {
            Self::Forward
        } else if delta < 0.0 {
            Self::Backward
        } else {
            previous
        }
    }
}

/// Visible scroller extent in CSS-like pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f64,
    /// Viewport height (the scroll axis).
    pub height: f64,
}

impl Viewport {
    /// Create a validated viewport with finite, positive extents.
    pub fn new(width: f64, height: f64) -> ScrubResult<Self> {
        let v = Self { width, height };
        v.validate()?;
        Ok(v)
    }

    /// Check that both extents are finite and `> 0`.
    pub fn validate(self) -> ScrubResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ScrubError::config("viewport width must be finite and > 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ScrubError::config("viewport height must be finite and > 0"));
        }
        Ok(())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
