//! Engine instance wiring the frame loop, scroll source and tracker together.

pub(crate) mod instance;
