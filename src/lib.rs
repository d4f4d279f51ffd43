#![cfg_attr(not(test), no_std)]

//! loctrack - Sensor modules for a battery-powered location tracker
//!
//! This library provides the duty-cycled sensor modules that collect
//! location evidence (satellite fixes, proximity beacons) and package it
//! for periodic uplink. The orchestrating scheduler, the receiver/radio
//! drivers and configuration persistence are external collaborators
//! reached through traits.
//!
//! Pure algorithms and types live in [`loctrack_core`] and are re-exported
//! here as [`types`].

// Mock collaborators use std collections in host builds
#[cfg(all(not(test), feature = "mock"))]
extern crate std;

// Logging macros and platform services (time)
pub mod core;

// Hardware collaborator contracts (GPS receiver, beacon scanner)
pub mod devices;

// Sensor module implementations of the lifecycle contract
pub mod modules;

// Mock collaborators for host testing
pub mod platform;

pub use loctrack_core as types;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// are exported at crate root via #[macro_export] in core::logging
