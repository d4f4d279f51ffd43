//! GPS Module Parameter Definitions
//!
//! # Parameters
//!
//! - `GPS_COLD_SECS` - Acquisition timeout without a recent fix (seconds)
//! - `GPS_WARM_SECS` - Base acquisition timeout with a fix under 24 h old (seconds)
//! - `GPS_PREC_THR` - Acceptability threshold in 0.1 m (lower is better)
//! - `GPS_MIN_FIXES` - Good fixes that must be exceeded before finishing early
//! - `GPS_FIX_MODE` - 0=always, 1=while moving, 2=on stop, 3=on demand
//! - `GPS_PWR_MODE` - 0=power on/off per round, 1=always on

use super::storage::ConfigStore;
use crate::fix::{FixMode, GpsPowerMode};

const DEFAULT_COLD_SECS: u32 = 2 * 60;
const MIN_COLD_SECS: u32 = 10;
const MAX_COLD_SECS: u32 = 15 * 60;

const DEFAULT_WARM_SECS: u32 = 60;
const MIN_WARM_SECS: u32 = 1;
const MAX_WARM_SECS: u32 = 15 * 60;

/// 10 m
const DEFAULT_PRECISION_THRESHOLD: u32 = 100;
const MIN_PRECISION_THRESHOLD: u32 = 1;
const MAX_PRECISION_THRESHOLD: u32 = 10_000;

const DEFAULT_MIN_GOOD_FIXES: u32 = 2;
const MAX_MIN_GOOD_FIXES: u32 = 20;

/// GPS module parameters, loaded once per round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsParams {
    /// Timeout when no usable fix exists or the last one is over 24 h old
    pub cold_timeout_secs: u32,
    /// Base timeout when a fix under 24 h old exists
    pub warm_timeout_secs: u32,
    /// Precision (0.1 m) strictly below which a fix is acceptable
    pub precision_threshold: i32,
    /// Good-fix count that must be exceeded to finish a round early
    pub min_good_fixes: u32,
    /// When to attempt acquisition
    pub fix_mode: FixMode,
    /// Receiver power strategy
    pub power_mode: GpsPowerMode,
}

impl Default for GpsParams {
    fn default() -> Self {
        Self {
            cold_timeout_secs: DEFAULT_COLD_SECS,
            warm_timeout_secs: DEFAULT_WARM_SECS,
            precision_threshold: DEFAULT_PRECISION_THRESHOLD as i32,
            min_good_fixes: DEFAULT_MIN_GOOD_FIXES,
            fix_mode: FixMode::Always,
            power_mode: GpsPowerMode::OnOff,
        }
    }
}

impl GpsParams {
    /// Load GPS parameters, registering defaults for missing keys and
    /// clamping out-of-range values.
    pub fn load(config: &mut dyn ConfigStore) -> Self {
        let cold_timeout_secs = config.get_or_add_u32(
            "GPS_COLD_SECS",
            DEFAULT_COLD_SECS,
            MIN_COLD_SECS,
            MAX_COLD_SECS,
        );
        let warm_timeout_secs = config.get_or_add_u32(
            "GPS_WARM_SECS",
            DEFAULT_WARM_SECS,
            MIN_WARM_SECS,
            MAX_WARM_SECS,
        );
        let precision_threshold = config.get_or_add_u32(
            "GPS_PREC_THR",
            DEFAULT_PRECISION_THRESHOLD,
            MIN_PRECISION_THRESHOLD,
            MAX_PRECISION_THRESHOLD,
        );
        let min_good_fixes =
            config.get_or_add_u32("GPS_MIN_FIXES", DEFAULT_MIN_GOOD_FIXES, 0, MAX_MIN_GOOD_FIXES);
        let fix_mode = config.get_or_add_u8(
            "GPS_FIX_MODE",
            FixMode::Always as u8,
            0,
            FixMode::OnDemand as u8,
        );
        let power_mode = config.get_or_add_u8(
            "GPS_PWR_MODE",
            GpsPowerMode::OnOff as u8,
            0,
            GpsPowerMode::AlwaysOn as u8,
        );

        Self {
            cold_timeout_secs,
            warm_timeout_secs,
            // MAX_PRECISION_THRESHOLD fits in i32
            precision_threshold: precision_threshold as i32,
            min_good_fixes,
            fix_mode: FixMode::from_u8(fix_mode),
            power_mode: GpsPowerMode::from_u8(power_mode),
        }
    }
}
