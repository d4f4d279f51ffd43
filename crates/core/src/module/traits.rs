//! Sensor module and app core traits

use super::{ActionId, DurationMillis, ExecGroup, ModuleId};
use crate::parameters::ConfigStore;
use crate::uplink::{UplinkError, UplinkRecord};

/// Services the orchestrator offers to modules during a round.
pub trait AppCore {
    /// Device is in its active (tracking) state
    fn is_device_active(&self) -> bool;

    /// Boot-clock second of the last movement seen by the motion detector
    /// (`None` if the device never moved since boot)
    fn last_moved_at_secs(&self) -> Option<u32>;

    /// Ask for an extra reporting round as soon as possible (fire-and-forget)
    fn force_uplink(&mut self);

    /// Shared configuration
    fn config(&mut self) -> &mut dyn ConfigStore;
}

/// Lifecycle contract implemented by every sensor module.
///
/// # Lifecycle
///
/// 1. `start()` - once per round; `0` means skip the rest of the round
/// 2. hardware events - delivered one at a time through the module's own
///    event handler while the budget runs
/// 3. `uplink_data()` - append results; safe even if nothing was started
/// 4. `stop()` - release the acquisition; safe if nothing was started
///
/// `off()`/`deepsleep()` release hardware unconditionally from any state
/// and leave stored result data intact.
pub trait SensorModule {
    /// Identifier used for registration and completion signals
    fn id(&self) -> ModuleId;

    /// Scheduling group
    fn exec_group(&self) -> ExecGroup;

    /// Begin this round's work and return its time budget
    fn start(&mut self, core: &mut dyn AppCore) -> DurationMillis;

    /// Release any acquisition in progress
    fn stop(&mut self);

    /// Power-off hook
    fn off(&mut self);

    /// Deep-sleep hook
    fn deepsleep(&mut self);

    /// Append this round's entries to `record`.
    ///
    /// Returns whether the round produced data worth an uplink.
    fn uplink_data(
        &mut self,
        core: &mut dyn AppCore,
        record: &mut UplinkRecord,
    ) -> Result<bool, UplinkError>;

    /// Whether the orchestrator should call `tick()` while waiting
    fn wants_tick(&self) -> bool {
        false
    }

    /// Periodic callback while waiting for the round to complete
    fn tick(&mut self) {}

    /// Downlink action this module registers, if any
    fn action(&self) -> Option<ActionId> {
        None
    }

    /// Handle the registered downlink action
    fn on_action(&mut self, _payload: &[u8], _core: &mut dyn AppCore) {}

    /// Display name
    fn name(&self) -> &'static str {
        self.id().as_str()
    }
}
