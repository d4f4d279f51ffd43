//! Adaptive fix acquisition module
//!
//! Decides once per round whether a satellite fix is worth the energy,
//! sizes the acquisition budget from the age of the last fix, merges the
//! fixes the receiver produces, and ends the round early once enough good
//! fixes agree.
//!
//! # Architecture
//!
//! - `AdaptiveFixEngine`: `SensorModule` implementation (Idle → Acquiring → Done)
//! - `MergeState` (core): attempt policy, timeout scaling, merge algorithm
//! - `GpsReceiver`: receiver manager; its own timeout is always disabled
//!
//! # Completion
//!
//! - `CommFail`: stop immediately, report comm-fail status
//! - `NewFix`: complete once the good-fix count exceeds the configured
//!   minimum, except in on-demand mode which always uses the full budget
//! - `SatelliteLost` / `Done`: complete with whatever was merged

use loctrack_core::fix::{
    AttemptDecision, FixMode, FixStatus, GpsFix, MergeState, GPS_FAILURE_RECORD_LEN,
    GPS_RECORD_LEN,
};
use loctrack_core::module::{
    ActionId, AppCore, DurationMillis, ExecGroup, ModuleId, RoundFlow, SensorModule,
};
use loctrack_core::parameters::GpsParams;
use loctrack_core::traits::TimeSource;
use loctrack_core::uplink::{UplinkError, UplinkRecord, UplinkTag};

use crate::devices::gps::{GpsEvent, GpsReceiver};

/// Acquisition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No acquisition (boot, after `stop()`, or round skipped)
    #[default]
    Idle,
    /// Receiver running, events are merged
    Acquiring,
    /// Round concluded, waiting for the orchestrator to stop us
    Done,
}

/// Fix acquisition and merge engine
pub struct AdaptiveFixEngine<R: GpsReceiver, T: TimeSource> {
    receiver: R,
    time: T,
    state: EngineState,
    merge: MergeState,
    params: GpsParams,
    /// This round started an acquisition
    attempted: bool,
}

impl<R: GpsReceiver, T: TimeSource> AdaptiveFixEngine<R, T> {
    /// Create the engine in `Idle`
    ///
    /// # Arguments
    ///
    /// * `receiver` - GPS receiver manager
    /// * `time` - Monotonic boot clock
    pub fn new(receiver: R, time: T) -> Self {
        Self {
            receiver,
            time,
            state: EngineState::Idle,
            merge: MergeState::new(),
            params: GpsParams::default(),
            attempted: false,
        }
    }

    /// Current acquisition state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Merge bookkeeping (held fix, counters)
    pub fn merge_state(&self) -> &MergeState {
        &self.merge
    }

    /// Parameters loaded by the last `start()`
    pub fn params(&self) -> &GpsParams {
        &self.params
    }

    /// Receiver manager
    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    /// Clock
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Handle one receiver event.
    ///
    /// Events outside `Acquiring` are ignored: the round is already over
    /// (or never started) and the held result must not change.
    pub fn on_event(&mut self, event: GpsEvent) -> RoundFlow {
        if self.state != EngineState::Acquiring {
            crate::log_trace!("MG: ignoring {} outside acquisition", event.as_str());
            return RoundFlow::Complete;
        }

        match event {
            GpsEvent::CommFail => {
                crate::log_warn!("MG: comm nok");
                self.merge.record_comm_failure();
                self.stop();
                RoundFlow::Complete
            }
            GpsEvent::CommOk => {
                crate::log_debug!("MG: comm ok");
                RoundFlow::Continue
            }
            GpsEvent::SatelliteLocked => {
                crate::log_debug!("MG: lock");
                RoundFlow::Continue
            }
            GpsEvent::NewFix(fix) => self.handle_fix(fix),
            GpsEvent::SatelliteLost => {
                crate::log_debug!("MG: no sat lock");
                self.finish()
            }
            GpsEvent::Done => {
                crate::log_debug!("MG: done");
                self.finish()
            }
        }
    }

    fn handle_fix(&mut self, fix: GpsFix) -> RoundFlow {
        if !fix.is_usable() {
            crate::log_debug!(
                "MG: unusable fix (prec {}, at {})",
                fix.precision,
                fix.captured_at_secs
            );
            return RoundFlow::Continue;
        }

        let acceptable = self.merge.merge_new_fix(fix, self.params.precision_threshold);
        let good = self.merge.good_fix_count();

        if acceptable
            && self.params.fix_mode != FixMode::OnDemand
            && good > self.params.min_good_fixes
        {
            crate::log_debug!("MG: fix done after {} good fixes", good);
            return self.finish();
        }

        crate::log_debug!("MG: fix prec {} ({} good)", fix.precision, good);
        RoundFlow::Continue
    }

    fn finish(&mut self) -> RoundFlow {
        self.state = EngineState::Done;
        RoundFlow::Complete
    }

    fn write_fix(&self, record: &mut UplinkRecord, fix: &GpsFix) -> Result<(), UplinkError> {
        let mut entry = record.entry(UplinkTag::Gps, GPS_RECORD_LEN)?;
        fix.write_record(FixStatus::Ok, &mut entry)
    }
}

impl<R: GpsReceiver, T: TimeSource> SensorModule for AdaptiveFixEngine<R, T> {
    fn id(&self) -> ModuleId {
        ModuleId::Gps
    }

    fn exec_group(&self) -> ExecGroup {
        // Shares the UART with the BLE radio
        ExecGroup::Serial
    }

    fn start(&mut self, core: &mut dyn AppCore) -> DurationMillis {
        self.params = GpsParams::load(core.config());
        self.receiver.set_power_mode(self.params.power_mode);

        let now = self.time.now_secs();
        let decision = self
            .merge
            .decide(self.params.fix_mode, now, core.last_moved_at_secs());

        match decision {
            AttemptDecision::Skip(reason) => {
                crate::log_debug!(
                    "MG: no fix this round ({}): {}",
                    self.params.fix_mode.name(),
                    reason.as_str()
                );
                self.attempted = false;
                0
            }
            AttemptDecision::Attempt => {
                let timeout_secs = self.merge.acquisition_timeout_secs(
                    now,
                    self.params.cold_timeout_secs,
                    self.params.warm_timeout_secs,
                );
                self.merge.begin_acquisition(now);
                self.attempted = true;
                self.state = EngineState::Acquiring;
                // This engine alone decides when acquisition ends
                self.receiver.start(None);

                crate::log_debug!(
                    "MG: acquiring ({}) for {}s",
                    self.params.fix_mode.name(),
                    timeout_secs
                );
                timeout_secs.saturating_mul(1000)
            }
        }
    }

    fn stop(&mut self) {
        if self.state != EngineState::Idle {
            self.receiver.stop();
        }
        self.state = EngineState::Idle;
    }

    fn off(&mut self) {
        self.receiver.power_off();
        self.state = EngineState::Idle;
    }

    fn deepsleep(&mut self) {
        self.receiver.power_off();
        self.state = EngineState::Idle;
    }

    fn uplink_data(
        &mut self,
        _core: &mut dyn AppCore,
        record: &mut UplinkRecord,
    ) -> Result<bool, UplinkError> {
        // On-stop reports its best knowledge even on rounds it skipped
        if !self.attempted && self.params.fix_mode != FixMode::OnStop {
            crate::log_debug!("MG: not attempted, nothing for UL");
            return Ok(false);
        }

        if let Some(fix) = self.merge.held() {
            self.write_fix(record, fix)?;
            crate::log_info!(
                "MG: UL fix {},{},{} p={} from {} sats",
                fix.latitude,
                fix.longitude,
                fix.altitude,
                fix.precision,
                fix.satellite_count
            );
            return Ok(true);
        }

        if !self.attempted {
            crate::log_info!("MG: no fix for UL");
            return Ok(false);
        }

        let status = if self.merge.comm_failed() {
            FixStatus::CommFail
        } else {
            FixStatus::NoFix
        };
        record
            .entry(UplinkTag::Gps, GPS_FAILURE_RECORD_LEN)?
            .put_u8(status as u8)?;
        crate::log_info!("MG: UL status {}", status.as_str());
        Ok(true)
    }

    fn action(&self) -> Option<ActionId> {
        Some(ActionId::FixGps)
    }

    /// Fix request: payload byte 0 (if non-zero) is the number of demand
    /// shots, otherwise one.
    fn on_action(&mut self, payload: &[u8], core: &mut dyn AppCore) {
        let shots = payload.first().copied().filter(|&n| n > 0).unwrap_or(1);
        crate::log_debug!("MG: action FIX x{}", shots);
        self.merge.set_demand_shots(shots);
        core.force_uplink();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{GpsCall, MockAppCore, MockGpsReceiver};
    use loctrack_core::fix::GpsPowerMode;
    use loctrack_core::parameters::ParamValue;
    use loctrack_core::traits::MockTime;

    type Engine = AdaptiveFixEngine<MockGpsReceiver, MockTime>;

    fn engine_at(secs: u32) -> Engine {
        let time = MockTime::new();
        time.set_secs(secs);
        AdaptiveFixEngine::new(MockGpsReceiver::new(), time)
    }

    fn core_with_mode(mode: FixMode) -> MockAppCore {
        let mut core = MockAppCore::new();
        GpsParams::load(&mut core.store);
        core.store
            .set("GPS_FIX_MODE", ParamValue::Uint(mode as u32))
            .unwrap();
        core
    }

    fn fix(precision: i32, at: u32) -> GpsFix {
        GpsFix {
            latitude: 450_000_000,
            longitude: 60_000_000,
            altitude: 2_000,
            precision,
            captured_at_secs: at,
            satellite_count: 8,
        }
    }

    fn decode_single(record: &UplinkRecord) -> (u8, usize, [u8; 22]) {
        let entry = record.entries().next().unwrap();
        let mut value = [0u8; 22];
        value[..entry.value.len()].copy_from_slice(entry.value);
        (entry.tag, entry.value.len(), value)
    }

    // ========================================================================
    // start()
    // ========================================================================

    #[test]
    fn test_first_round_uses_cold_timeout_and_disables_receiver_timeout() {
        let mut engine = engine_at(1000);
        let mut core = core_with_mode(FixMode::Always);

        assert_eq!(engine.start(&mut core), 120_000);
        assert_eq!(engine.state(), EngineState::Acquiring);
        assert_eq!(
            engine.receiver().calls.as_slice(),
            &[GpsCall::SetPowerMode(GpsPowerMode::OnOff), GpsCall::Start(None)]
        );
    }

    #[test]
    fn test_warm_timeout_after_recent_fix() {
        let mut engine = engine_at(1000);
        let mut core = core_with_mode(FixMode::Always);

        engine.start(&mut core);
        engine.on_event(GpsEvent::NewFix(fix(50, 1000)));
        engine.stop();

        // 48 minutes later: warm 60 s + 2 s
        engine.time().set_secs(1000 + 48 * 60);
        assert_eq!(engine.start(&mut core), 62_000);
    }

    #[test]
    fn test_on_demand_without_demand_does_nothing() {
        let mut engine = engine_at(10);
        let mut core = core_with_mode(FixMode::OnDemand);

        assert_eq!(engine.start(&mut core), 0);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(!engine.receiver().started());

        let mut record = UplinkRecord::new();
        assert_eq!(engine.uplink_data(&mut core, &mut record), Ok(false));
        assert!(record.is_empty());
    }

    #[test]
    fn test_fix_action_grants_demand_and_forces_uplink() {
        let mut engine = engine_at(10);
        let mut core = core_with_mode(FixMode::OnDemand);

        assert_eq!(engine.action(), Some(ActionId::FixGps));
        engine.on_action(&[], &mut core);
        assert_eq!(core.force_uplink_count, 1);
        assert_eq!(engine.merge_state().demand_shots(), 1);

        assert_ne!(engine.start(&mut core), 0);
        assert_eq!(engine.merge_state().demand_shots(), 0);

        engine.on_action(&[3], &mut core);
        assert_eq!(engine.merge_state().demand_shots(), 3);
    }

    // ========================================================================
    // Events
    // ========================================================================

    #[test]
    fn test_completes_when_good_fixes_exceed_minimum() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);

        assert_eq!(engine.on_event(GpsEvent::CommOk), RoundFlow::Continue);
        assert_eq!(engine.on_event(GpsEvent::SatelliteLocked), RoundFlow::Continue);
        // Default minimum is 2: the third good fix ends the round
        assert_eq!(engine.on_event(GpsEvent::NewFix(fix(60, 101))), RoundFlow::Continue);
        assert_eq!(engine.on_event(GpsEvent::NewFix(fix(40, 102))), RoundFlow::Continue);
        assert_eq!(engine.on_event(GpsEvent::NewFix(fix(50, 103))), RoundFlow::Complete);
        assert_eq!(engine.state(), EngineState::Done);
        assert_eq!(engine.merge_state().good_fix_count(), 3);
    }

    #[test]
    fn test_poor_fixes_do_not_complete_round() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);

        for at in 101..110 {
            assert_eq!(engine.on_event(GpsEvent::NewFix(fix(500, at))), RoundFlow::Continue);
        }
        assert_eq!(engine.merge_state().good_fix_count(), 0);
    }

    #[test]
    fn test_on_demand_runs_full_budget() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::OnDemand);
        engine.on_action(&[], &mut core);
        engine.start(&mut core);

        for at in 101..120 {
            assert_eq!(engine.on_event(GpsEvent::NewFix(fix(10, at))), RoundFlow::Continue);
        }
        assert_eq!(engine.state(), EngineState::Acquiring);
        assert_eq!(engine.on_event(GpsEvent::Done), RoundFlow::Complete);
    }

    #[test]
    fn test_comm_fail_stops_and_reports_status() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);

        assert_eq!(engine.on_event(GpsEvent::CommFail), RoundFlow::Complete);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.receiver().count(GpsCall::Stop), 1);

        let mut record = UplinkRecord::new();
        assert_eq!(engine.uplink_data(&mut core, &mut record), Ok(true));
        assert_eq!(record.as_bytes(), &[UplinkTag::Gps as u8, 1, FixStatus::CommFail as u8]);
    }

    #[test]
    fn test_satellite_loss_reports_no_fix() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);

        assert_eq!(engine.on_event(GpsEvent::SatelliteLost), RoundFlow::Complete);
        engine.stop();

        let mut record = UplinkRecord::new();
        assert_eq!(engine.uplink_data(&mut core, &mut record), Ok(true));
        assert_eq!(record.as_bytes(), &[UplinkTag::Gps as u8, 1, FixStatus::NoFix as u8]);
    }

    #[test]
    fn test_unusable_fix_ignored() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);

        engine.on_event(GpsEvent::NewFix(fix(-1, 101)));
        assert!(engine.merge_state().held().is_none());
    }

    #[test]
    fn test_fix_without_capture_time_ignored() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);

        assert_eq!(engine.on_event(GpsEvent::NewFix(fix(10, 0))), RoundFlow::Continue);
        assert!(engine.merge_state().held().is_none());
        assert_eq!(engine.merge_state().last_fix_at(), None);
        engine.stop();

        let mut record = UplinkRecord::new();
        assert_eq!(engine.uplink_data(&mut core, &mut record), Ok(true));
        assert_eq!(record.as_bytes(), &[UplinkTag::Gps as u8, 1, FixStatus::NoFix as u8]);

        // No timestamp was adopted, so the next attempt is still cold
        core.last_moved_at = Some(200);
        engine.time().set_secs(300);
        assert_eq!(engine.start(&mut core), 120_000);
    }

    #[test]
    fn test_events_after_stop_are_ignored() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);
        engine.on_event(GpsEvent::NewFix(fix(30, 101)));
        engine.stop();

        assert_eq!(engine.on_event(GpsEvent::NewFix(fix(5, 102))), RoundFlow::Complete);
        assert_eq!(engine.merge_state().held().unwrap().precision, 30);
    }

    // ========================================================================
    // Uplink
    // ========================================================================

    #[test]
    fn test_stopped_mid_acquisition_reports_partial_fix() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);
        engine.on_event(GpsEvent::NewFix(fix(300, 150)));

        // Budget elapsed without completion
        engine.stop();

        let mut record = UplinkRecord::new();
        assert_eq!(engine.uplink_data(&mut core, &mut record), Ok(true));
        let (tag, len, value) = decode_single(&record);
        assert_eq!(tag, UplinkTag::Gps as u8);
        assert_eq!(len, 22);
        let (status, decoded) = GpsFix::from_record(&value).unwrap();
        assert_eq!(status, FixStatus::Ok);
        assert_eq!(decoded, fix(300, 150));
    }

    #[test]
    fn test_failed_round_then_stationary_skips() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        core.last_moved_at = Some(50);

        engine.start(&mut core);
        engine.on_event(GpsEvent::SatelliteLost);
        engine.stop();

        engine.time().set_secs(1000);
        assert_eq!(engine.start(&mut core), 0);

        // Movement after the failed attempt re-enables acquisition
        core.last_moved_at = Some(900);
        assert_ne!(engine.start(&mut core), 0);
    }

    /// Design choice: on-stop mode reports its best-known fix even on rounds
    /// where `start()` chose not to acquire.
    #[test]
    fn test_on_stop_reports_best_fix_on_skipped_round() {
        let mut engine = engine_at(1000);
        let mut core = core_with_mode(FixMode::OnStop);
        core.last_moved_at = Some(100);

        assert_ne!(engine.start(&mut core), 0);
        engine.on_event(GpsEvent::NewFix(fix(40, 1001)));
        engine.on_event(GpsEvent::Done);
        engine.stop();

        // No movement since the fix: skipped, but still reported
        engine.time().set_secs(2000);
        assert_eq!(engine.start(&mut core), 0);
        let mut record = UplinkRecord::new();
        assert_eq!(engine.uplink_data(&mut core, &mut record), Ok(true));
        let (_, len, value) = decode_single(&record);
        assert_eq!(len, 22);
        assert_eq!(GpsFix::from_record(&value).unwrap().1, fix(40, 1001));
    }

    #[test]
    fn test_uplink_overflow_is_reported() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);
        engine.on_event(GpsEvent::NewFix(fix(30, 101)));

        let mut record = UplinkRecord::new();
        record.append(UplinkTag::BleCurrent, &[0u8; 240]).unwrap();
        assert!(matches!(
            engine.uplink_data(&mut core, &mut record),
            Err(UplinkError::Overflow { .. })
        ));
    }

    #[test]
    fn test_power_hooks_release_receiver_and_keep_result() {
        let mut engine = engine_at(100);
        let mut core = core_with_mode(FixMode::Always);
        engine.start(&mut core);
        engine.on_event(GpsEvent::NewFix(fix(30, 101)));

        engine.deepsleep();
        engine.off();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.receiver().count(GpsCall::PowerOff), 2);
        assert_eq!(engine.merge_state().held().unwrap().precision, 30);

        // Idempotent from idle, and stop() after that is harmless
        engine.stop();
        assert_eq!(engine.receiver().count(GpsCall::Stop), 0);
    }

    #[test]
    fn test_module_identity() {
        let engine = engine_at(0);
        assert_eq!(engine.id(), ModuleId::Gps);
        assert_eq!(engine.name(), "GPS");
        assert_eq!(engine.exec_group(), ExecGroup::Serial);
        assert!(!engine.wants_tick());
    }
}
