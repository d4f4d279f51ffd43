//! Proximity Beacon Types
//!
//! Pure data structures for iBeacon proximity tracking: the observation
//! record, the bounded observation table, and the error set surfaced in
//! uplinks.
//!
//! # Uplink Layout
//!
//! Each reported beacon takes 5 bytes:
//! `major_lo:u8, minor_lo:u8, minor_hi:u8, rssi:i8, extra:u8`.
//! The major's high byte is not sent; it does not take part in
//! identification for navigation beacons.

pub mod table;

pub use table::{BeaconErrors, BeaconTable, ObserveOutcome, BEACON_TABLE_CAPACITY};

/// Bytes per beacon in an uplink record
pub const BEACON_RECORD_LEN: usize = 5;

/// One iBeacon sighting, keyed by `minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BeaconObservation {
    /// iBeacon major (constant within a scan window)
    pub major: u16,
    /// iBeacon minor, the identity key
    pub minor: u16,
    /// Received signal strength in dBm
    pub rssi: i8,
    /// Advertiser-specific extra byte
    pub extra: u8,
    /// Boot-clock second of the latest sighting
    pub last_seen_at_secs: u32,
}

impl BeaconObservation {
    /// Encode the 5-byte uplink entry
    pub fn to_record(&self) -> [u8; BEACON_RECORD_LEN] {
        let [major_lo, _] = self.major.to_le_bytes();
        let [minor_lo, minor_hi] = self.minor.to_le_bytes();
        [major_lo, minor_lo, minor_hi, self.rssi as u8, self.extra]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beacon_record_layout() {
        let obs = BeaconObservation {
            major: 0x1234,
            minor: 0xABCD,
            rssi: -70,
            extra: 0x42,
            last_seen_at_secs: 99,
        };
        assert_eq!(obs.to_record(), [0x34, 0xCD, 0xAB, (-70i8) as u8, 0x42]);
    }
}
