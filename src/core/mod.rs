//! Core firmware infrastructure
//!
//! Logging macros and the Embassy-backed time source. Pure types are in
//! `loctrack_core`.

pub mod logging;
pub mod time;

pub use time::*;
