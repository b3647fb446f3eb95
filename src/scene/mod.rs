//! JSON scenes and the scripted simulation driver.

pub(crate) mod loader;
pub(crate) mod model;
pub(crate) mod simulate;
