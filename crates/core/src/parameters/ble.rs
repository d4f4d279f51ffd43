//! BLE Scan Parameter Definitions
//!
//! # Parameters
//!
//! - `BLE_MAX_NAV_UL` - Beacons sent per uplink (1..=[`MAX_BEACONS_PER_UPLINK`])
//! - `BLE_SCAN_MS` - Scan window per round in milliseconds
//! - `BLE_TIMEOUT_S` - Seconds unseen before a beacon leaves the table
//! - `BLE_UUID` - iBeacon proximity UUID to scan for

use super::storage::{ConfigStore, UUID_LEN};

/// Compile-time cap on beacons reported in one uplink record
pub const MAX_BEACONS_PER_UPLINK: u8 = 8;

const DEFAULT_SCAN_TIME_MS: u32 = 3_000;
const MIN_SCAN_TIME_MS: u32 = 1_000;
const MAX_SCAN_TIME_MS: u32 = 60_000;

const DEFAULT_BEACON_TIMEOUT_SECS: u32 = 5 * 60;
const MIN_BEACON_TIMEOUT_SECS: u32 = 10;
const MAX_BEACON_TIMEOUT_SECS: u32 = 24 * 60 * 60;

/// Beacon scan parameters, loaded once per round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleScanParams {
    /// Maximum beacons per uplink record
    pub max_per_uplink: u8,
    /// Scan window returned as the round budget
    pub scan_time_ms: u32,
    /// Eviction timeout for unseen beacons
    pub beacon_timeout_secs: u32,
    /// iBeacon UUID filter
    pub uuid: [u8; UUID_LEN],
}

impl Default for BleScanParams {
    fn default() -> Self {
        Self {
            max_per_uplink: MAX_BEACONS_PER_UPLINK,
            scan_time_ms: DEFAULT_SCAN_TIME_MS,
            beacon_timeout_secs: DEFAULT_BEACON_TIMEOUT_SECS,
            uuid: [0; UUID_LEN],
        }
    }
}

impl BleScanParams {
    /// Load scan parameters, registering defaults for missing keys and
    /// clamping out-of-range values.
    pub fn load(config: &mut dyn ConfigStore) -> Self {
        Self {
            max_per_uplink: config.get_or_add_u8(
                "BLE_MAX_NAV_UL",
                MAX_BEACONS_PER_UPLINK,
                1,
                MAX_BEACONS_PER_UPLINK,
            ),
            scan_time_ms: config.get_or_add_u32(
                "BLE_SCAN_MS",
                DEFAULT_SCAN_TIME_MS,
                MIN_SCAN_TIME_MS,
                MAX_SCAN_TIME_MS,
            ),
            beacon_timeout_secs: config.get_or_add_u32(
                "BLE_TIMEOUT_S",
                DEFAULT_BEACON_TIMEOUT_SECS,
                MIN_BEACON_TIMEOUT_SECS,
                MAX_BEACON_TIMEOUT_SECS,
            ),
            uuid: config.get_or_add_uuid("BLE_UUID", [0; UUID_LEN]),
        }
    }
}
