//! Hardware collaborator contracts
//!
//! The sensor modules never touch UART framing or radio protocols
//! directly. They drive the receiver and radio managers through these
//! traits and receive their asynchronous results as event enums.
//!
//! ## Modules
//!
//! - `gps`: Satellite receiver manager contract and events
//! - `ble`: iBeacon scanner manager contract and events

pub mod ble;
pub mod gps;

pub use ble::{BeaconScanner, BleEvent, MajorRange};
pub use gps::{GpsEvent, GpsReceiver};
