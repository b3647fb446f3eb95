//! Scroll signal: native pass-through or inertial glide, sampled once per frame.

pub(crate) mod source;
