//! Configuration types
//!
//! Board-agnostic settings. The runtime loads them from TOML when the
//! `serde` feature is enabled.

pub mod types;

pub use types::*;
