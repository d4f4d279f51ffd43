//! Beacon presence change detector
//!
//! Scans for one iBeacon UUID during a fixed window each round, keeps the
//! sightings in a bounded minor-keyed table, and reports the strongest
//! beacons together with whether the set of beacons in range changed.
//!
//! Change detection compares an order-independent hash of the resident
//! minors taken before the round with the hash after eviction at uplink
//! time. RSSI or extra-byte changes alone never count as a change.

use loctrack_core::beacon::{
    BeaconErrors, BeaconObservation, BeaconTable, ObserveOutcome, BEACON_RECORD_LEN,
    BEACON_TABLE_CAPACITY,
};
use loctrack_core::module::{
    AppCore, DurationMillis, ExecGroup, ModuleId, RoundFlow, SensorModule,
};
use loctrack_core::parameters::{BleScanParams, MAX_BEACONS_PER_UPLINK};
use loctrack_core::traits::TimeSource;
use loctrack_core::uplink::{UplinkError, UplinkRecord, UplinkTag, TLV_HEADER_LEN};

use crate::devices::ble::{BeaconScanner, BleEvent, MajorRange};

/// Majors reserved for navigation beacons
pub const NAV_MAJORS: MajorRange = 0x0000..=0x00FF;

/// Value length of the error-mask entry
const ERROR_MASK_LEN: usize = 1;

/// Beacon table and change detection module
pub struct BeaconChangeDetector<S: BeaconScanner, T: TimeSource> {
    scanner: S,
    time: T,
    table: BeaconTable,
    params: BleScanParams,
    scanning: bool,
    hash_before: u32,
}

impl<S: BeaconScanner, T: TimeSource> BeaconChangeDetector<S, T> {
    pub fn new(scanner: S, time: T) -> Self {
        Self {
            scanner,
            time,
            table: BeaconTable::new(),
            params: BleScanParams::default(),
            scanning: false,
            hash_before: 0,
        }
    }

    pub fn table(&self) -> &BeaconTable {
        &self.table
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Handle one scanner event.
    ///
    /// Sightings are stamped with this module's clock on receipt so that
    /// eviction and the sightings share one time base.
    pub fn on_event(&mut self, event: BleEvent) -> RoundFlow {
        if !self.scanning {
            crate::log_trace!("BLE: ignoring {} outside scan", event.as_str());
            return RoundFlow::Complete;
        }

        match event {
            BleEvent::CommOk => {
                crate::log_debug!("BLE: comm ok, scanning");
                self.scanner
                    .start_scan(&self.params.uuid, NAV_MAJORS, BEACON_TABLE_CAPACITY);
                RoundFlow::Continue
            }
            BleEvent::Beacon(observation) => {
                let stamped = BeaconObservation {
                    last_seen_at_secs: self.time.now_secs(),
                    ..observation
                };
                if self.table.observe(stamped) == ObserveOutcome::Rejected {
                    crate::log_warn!("BLE: table full, minor {} dropped", stamped.minor);
                }
                RoundFlow::Continue
            }
            BleEvent::CommFail => {
                crate::log_warn!("BLE: comm fail");
                self.table.raise(BeaconErrors::COMM_FAIL);
                self.stop();
                RoundFlow::Complete
            }
        }
    }

    fn evict(&mut self) {
        let evicted = self
            .table
            .evict_stale(self.time.now_secs(), self.params.beacon_timeout_secs);
        if evicted > 0 {
            crate::log_debug!("BLE: evicted {} beacons", evicted);
        }
    }

    fn release_radio(&mut self) {
        self.scanner.stop_scan();
        self.scanner.power_off();
        self.scanning = false;
    }
}

impl<S: BeaconScanner, T: TimeSource> SensorModule for BeaconChangeDetector<S, T> {
    fn id(&self) -> ModuleId {
        ModuleId::BleScanAlert
    }

    fn exec_group(&self) -> ExecGroup {
        ExecGroup::Serial
    }

    fn start(&mut self, core: &mut dyn AppCore) -> DurationMillis {
        if !core.is_device_active() {
            crate::log_debug!("BLE: device inactive, no scan");
            return 0;
        }

        self.params = BleScanParams::load(core.config());
        self.table.clear_errors();
        self.hash_before = self.table.presence_hash();

        self.scanner.power_on();
        self.scanning = true;
        crate::log_debug!(
            "BLE: scan {}ms, {} resident",
            self.params.scan_time_ms,
            self.table.len()
        );
        self.params.scan_time_ms
    }

    fn stop(&mut self) {
        if self.scanning {
            self.release_radio();
        }
        self.evict();
    }

    fn off(&mut self) {
        self.release_radio();
    }

    fn deepsleep(&mut self) {
        self.release_radio();
    }

    fn uplink_data(
        &mut self,
        core: &mut dyn AppCore,
        record: &mut UplinkRecord,
    ) -> Result<bool, UplinkError> {
        if !core.is_device_active() {
            return Ok(false);
        }

        self.evict();
        self.table.check_capacity();

        let max = self.params.max_per_uplink.min(MAX_BEACONS_PER_UPLINK);
        let best = self.table.strongest(usize::from(max));
        let errors = self.table.errors();

        // All entries of this module go in together or not at all
        let mut needed = TLV_HEADER_LEN + best.len() * BEACON_RECORD_LEN;
        if !errors.is_empty() {
            needed += TLV_HEADER_LEN + ERROR_MASK_LEN;
        }
        let remaining = record.remaining();
        if needed > remaining {
            crate::log_warn!("BLE: no room for UL ({} > {})", needed, remaining);
            return Err(UplinkError::Overflow { needed, remaining });
        }

        if best.is_empty() {
            record.append_marker(UplinkTag::BleCurrent)?;
        } else {
            let mut entry = record.entry(UplinkTag::BleCurrent, best.len() * BEACON_RECORD_LEN)?;
            for observation in &best {
                entry.put_bytes(&observation.to_record())?;
            }
        }

        if !errors.is_empty() {
            record.append(UplinkTag::BleErrorMask, &[errors.bits()])?;
        }

        let hash = self.table.presence_hash();
        let changed = hash != self.hash_before;
        crate::log_info!(
            "BLE: UL {} beacons, errors 0x{:02x}, changed {}",
            best.len(),
            errors.bits(),
            changed
        );
        Ok(changed)
    }
}
