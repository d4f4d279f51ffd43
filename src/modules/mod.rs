//! Sensor modules
//!
//! Implementations of the [`SensorModule`](loctrack_core::module::SensorModule)
//! lifecycle contract. Each module owns its private state, its hardware
//! manager, and a clock; nothing is shared between modules.
//!
//! ## Modules
//!
//! - `gps`: Adaptive fix acquisition and merge engine
//! - `ble_scan_alert`: Beacon presence change detector

pub mod ble_scan_alert;
pub mod gps;

pub use ble_scan_alert::BeaconChangeDetector;
pub use gps::{AdaptiveFixEngine, EngineState};
