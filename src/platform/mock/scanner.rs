//! Mock beacon scanner

use crate::devices::ble::{BeaconScanner, MajorRange};
use loctrack_core::parameters::UUID_LEN;
use std::vec::Vec;

/// One call made on the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCall {
    PowerOn,
    StartScan {
        uuid: [u8; UUID_LEN],
        majors: MajorRange,
        max_tracked: usize,
    },
    StopScan,
    PowerOff,
}

/// Scanner that records every call
#[derive(Debug, Default)]
pub struct MockBeaconScanner {
    /// Calls in order
    pub calls: Vec<ScanCall>,
}

impl MockBeaconScanner {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Number of times `call` was made
    pub fn count(&self, call: ScanCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl BeaconScanner for MockBeaconScanner {
    fn power_on(&mut self) {
        self.calls.push(ScanCall::PowerOn);
    }

    fn start_scan(&mut self, uuid: &[u8; UUID_LEN], majors: MajorRange, max_tracked: usize) {
        self.calls.push(ScanCall::StartScan {
            uuid: *uuid,
            majors,
            max_tracked,
        });
    }

    fn stop_scan(&mut self) {
        self.calls.push(ScanCall::StopScan);
    }

    fn power_off(&mut self) {
        self.calls.push(ScanCall::PowerOff);
    }
}
