//! loctrack_core - Pure no_std business logic for the loctrack sensor modules
//!
//! This crate contains the platform-agnostic algorithms and types used by the
//! location tracker firmware. Everything here can be tested on host without
//! feature flags, hardware, or an async runtime.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Platform services (time, config, app core) injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)
//! - [`parameters`]: Parameter store with clamped get-or-default access
//! - [`fix`]: Location fix record, fix modes, and the fix merge algorithm
//! - [`beacon`]: Bounded proximity-beacon table and presence hashing
//! - [`uplink`]: Append-only tag-length-value uplink record
//! - [`module`]: Sensor module lifecycle contract

#![no_std]

pub mod beacon;
pub mod fix;
pub mod module;
pub mod parameters;
pub mod traits;
pub mod uplink;
