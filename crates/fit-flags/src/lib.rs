//! # fit-flags
//!
//! Feature flag lookups with a short-lived in-process cache.
//!
//! [`FlagCache`] fronts a [`FlagSource`] (the `feature_flags` table in
//! production). Reads inside the TTL window are served from memory; writes
//! go straight to the source and invalidate what they touch.

mod cache;
mod source;

pub use cache::{DEFAULT_TTL, FlagCache};
pub use source::FlagSource;
