//! Repository modules implementing storage operations for Stackfit entities.
//!
//! Each module adds methods to `FitService` via `impl FitService` blocks.

pub mod assessment;
pub mod company;
pub mod config_version;
pub mod feature_flag;
