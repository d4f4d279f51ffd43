//! Mock collaborators for testing
//!
//! Recording implementations of the receiver, scanner and application core
//! contracts so module rounds can be driven without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use loctrack::platform::mock::{GpsCall, MockGpsReceiver};
//! use loctrack::devices::GpsReceiver;
//!
//! let mut receiver = MockGpsReceiver::new();
//! receiver.start(None);
//! receiver.stop();
//! assert_eq!(receiver.calls, vec![GpsCall::Start(None), GpsCall::Stop]);
//! ```

#![cfg(any(test, feature = "mock"))]

mod app_core;
mod gps;
mod scanner;

pub use app_core::MockAppCore;
pub use gps::{GpsCall, MockGpsReceiver};
pub use scanner::{MockBeaconScanner, ScanCall};
