//! Shared primitives: ids, viewport, direction, numeric helpers and the error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
