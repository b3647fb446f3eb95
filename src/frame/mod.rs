//! Frame clock, listener registry and explicit disposal.

pub(crate) mod clock;
pub(crate) mod registry;
pub(crate) mod scope;
