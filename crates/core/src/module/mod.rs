//! Sensor Module Contract
//!
//! Defines the lifecycle contract between the orchestrating scheduler
//! (app core) and each sensor module. Modeled after a duty-cycled
//! start/stop/report interface:
//!
//! 1. `start()` arms the module's hardware and returns a time budget in
//!    milliseconds (`0` = nothing to do this round).
//! 2. Hardware events reach the module through its own event handler and
//!    may end the round early by returning [`RoundFlow::Complete`].
//! 3. `uplink_data()` appends the round's result to the shared record.
//! 4. `stop()` releases the acquisition.
//!
//! `off()` and `deepsleep()` are power-transition hooks callable from any
//! state. None of these calls block.

mod traits;

pub use traits::{AppCore, SensorModule};

/// Time budget returned by `start()`; zero means "skip this round"
pub type DurationMillis = u32;

/// Module identifiers known to the app core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleId {
    /// Satellite positioning
    Gps,
    /// Proximity beacon change detection
    BleScanAlert,
}

impl ModuleId {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Gps => "GPS",
            ModuleId::BleScanAlert => "BLE-SCAN-ALERT",
        }
    }
}

/// Scheduling group declared statically by each module.
///
/// Modules in the `Serial` group share a physical transport (the UART that
/// reaches both the GPS receiver and the BLE radio) and are run one at a
/// time by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecGroup {
    /// Shares a transport with other serial modules
    Serial,
    /// Independent hardware
    Parallel,
}

impl ExecGroup {
    /// Whether two modules may run at the same time
    pub fn may_overlap(a: ExecGroup, b: ExecGroup) -> bool {
        a != ExecGroup::Serial && b != ExecGroup::Serial
    }
}

/// Downlink actions a module can register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionId {
    /// Request an immediate GPS fix
    FixGps,
}

/// Whether a hardware event ended the module's round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundFlow {
    /// Keep waiting for events or the budget to elapse
    Continue,
    /// Module is done; the orchestrator can collect uplink data
    Complete,
}
