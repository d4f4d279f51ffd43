//! Mock GPS receiver manager

use crate::devices::gps::GpsReceiver;
use loctrack_core::fix::GpsPowerMode;
use std::vec::Vec;

/// One call made on the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsCall {
    SetPowerMode(GpsPowerMode),
    Start(Option<u32>),
    Stop,
    PowerOff,
}

/// Receiver that records every call
#[derive(Debug, Default)]
pub struct MockGpsReceiver {
    /// Calls in order
    pub calls: Vec<GpsCall>,
}

impl MockGpsReceiver {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Number of times `call` was made
    pub fn count(&self, call: GpsCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    /// Whether acquisition was ever started
    pub fn started(&self) -> bool {
        self.calls.iter().any(|c| matches!(c, GpsCall::Start(_)))
    }
}

impl GpsReceiver for MockGpsReceiver {
    fn set_power_mode(&mut self, mode: GpsPowerMode) {
        self.calls.push(GpsCall::SetPowerMode(mode));
    }

    fn start(&mut self, timeout_secs: Option<u32>) {
        self.calls.push(GpsCall::Start(timeout_secs));
    }

    fn stop(&mut self) {
        self.calls.push(GpsCall::Stop);
    }

    fn power_off(&mut self) {
        self.calls.push(GpsCall::PowerOff);
    }
}
