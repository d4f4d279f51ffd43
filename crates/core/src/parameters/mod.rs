//! Parameter management types and utilities
//!
//! This module provides the parameter store used by sensor modules to fetch
//! their tunables once per round, plus the typed parameter groups for each
//! module. Flash persistence is owned by the external configuration layer.

pub mod ble;
pub mod error;
pub mod gps;
pub mod storage;

pub use ble::{BleScanParams, MAX_BEACONS_PER_UPLINK};
pub use error::ParameterError;
pub use gps::GpsParams;
pub use storage::{
    ConfigStore, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN, UUID_LEN,
};
