//! Progress-to-value machinery: easing, keyframe channels, staggers and time-based tweens.

pub(crate) mod channel;
pub(crate) mod ease;
pub(crate) mod stagger;
pub(crate) mod tween;
pub(crate) mod value;
