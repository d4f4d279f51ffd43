//! iBeacon scanner manager contract
//!
//! The manager powers the BLE radio, reports when it answers, and forwards
//! every matching iBeacon advertisement as a [`BleEvent::Beacon`].

use core::ops::RangeInclusive;

use loctrack_core::beacon::BeaconObservation;
use loctrack_core::parameters::UUID_LEN;

/// Inclusive range of iBeacon majors accepted by a scan
pub type MajorRange = RangeInclusive<u16>;

/// Asynchronous scanner events, matched exhaustively by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleEvent {
    /// Radio did not answer on its transport
    CommFail,
    /// Radio answered and is ready to scan
    CommOk,
    /// Matching iBeacon seen
    Beacon(BeaconObservation),
}

impl BleEvent {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            BleEvent::CommFail => "comm-fail",
            BleEvent::CommOk => "comm-ok",
            BleEvent::Beacon(_) => "beacon",
        }
    }
}

/// Scanner manager operations used by the beacon detector
///
/// # Invariants
///
/// - `power_on()` is answered by `CommOk` or `CommFail`
/// - `stop_scan()` and `power_off()` are safe to call when idle
pub trait BeaconScanner {
    /// Power the radio and open its transport
    fn power_on(&mut self);

    /// Start scanning for `uuid` within `majors`, reporting at most
    /// `max_tracked` distinct beacons
    fn start_scan(&mut self, uuid: &[u8; UUID_LEN], majors: MajorRange, max_tracked: usize);

    /// Stop scanning
    fn stop_scan(&mut self);

    /// Cut radio power
    fn power_off(&mut self);
}
