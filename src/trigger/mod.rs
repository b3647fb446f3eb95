//! Scroll-triggered elements: markers, progress tracking, pinning and reveals.

pub(crate) mod hooks;
pub(crate) mod marker;
pub(crate) mod pin;
pub(crate) mod reveal;
pub(crate) mod tracker;
