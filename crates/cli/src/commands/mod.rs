//! CLI command implementations.
//!
//! Each command opens its own database connection and closes it before
//! returning, whether the job succeeded or not.

pub mod seed;
pub mod sessions;
pub mod setup;
pub mod status;
