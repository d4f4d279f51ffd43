//! Bounded beacon observation table
//!
//! Fixed-capacity map from `minor` to the latest observation of that
//! beacon. A sighting of a resident beacon overwrites it; a new beacon is
//! inserted while there is room and rejected (raising `TABLE_FULL`)
//! otherwise. The presence hash is the wrapping sum of resident minors, so
//! it only changes when membership changes, never on RSSI jitter.

use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::Vec;

use super::BeaconObservation;

/// Maximum beacons tracked between scans
pub const BEACON_TABLE_CAPACITY: usize = 16;

bitflags! {
    /// Non-fatal beacon scan errors, sent as one byte in the uplink
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BeaconErrors: u8 {
        /// Scanner did not answer on its transport
        const COMM_FAIL = 0b0000_0001;
        /// Table reached capacity; enter/exit of further beacons may be missed
        const TABLE_FULL = 0b0000_0010;
    }
}

/// What happened to a sighting offered to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// Beacon already resident; entry refreshed
    Updated,
    /// Beacon newly resident
    Inserted,
    /// Table full; sighting dropped
    Rejected,
}

/// Bounded minor-keyed observation table with error set
#[derive(Debug, Default)]
pub struct BeaconTable {
    entries: FnvIndexMap<u16, BeaconObservation, BEACON_TABLE_CAPACITY>,
    errors: BeaconErrors,
}

impl BeaconTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            errors: BeaconErrors::empty(),
        }
    }

    /// Offer a sighting to the table
    pub fn observe(&mut self, observation: BeaconObservation) -> ObserveOutcome {
        if let Some(entry) = self.entries.get_mut(&observation.minor) {
            *entry = observation;
            return ObserveOutcome::Updated;
        }

        match self.entries.insert(observation.minor, observation) {
            Ok(_) => ObserveOutcome::Inserted,
            Err(_) => {
                self.errors.insert(BeaconErrors::TABLE_FULL);
                ObserveOutcome::Rejected
            }
        }
    }

    /// Remove beacons unseen for longer than `timeout_secs`.
    ///
    /// Returns the number of evicted entries.
    pub fn evict_stale(&mut self, now_secs: u32, timeout_secs: u32) -> usize {
        let stale: Vec<u16, BEACON_TABLE_CAPACITY> = self
            .entries
            .values()
            .filter(|obs| now_secs.saturating_sub(obs.last_seen_at_secs) > timeout_secs)
            .map(|obs| obs.minor)
            .collect();

        for minor in &stale {
            self.entries.remove(minor);
        }
        stale.len()
    }

    /// Raise `TABLE_FULL` if every slot is taken
    pub fn check_capacity(&mut self) {
        if self.is_full() {
            self.errors.insert(BeaconErrors::TABLE_FULL);
        }
    }

    /// Wrapping sum of resident minors
    pub fn presence_hash(&self) -> u32 {
        self.entries
            .keys()
            .fold(0u32, |hash, minor| hash.wrapping_add(u32::from(*minor)))
    }

    /// Up to `max` resident beacons, strongest signal first
    pub fn strongest(&self, max: usize) -> Vec<BeaconObservation, BEACON_TABLE_CAPACITY> {
        let mut best: Vec<BeaconObservation, BEACON_TABLE_CAPACITY> =
            self.entries.values().copied().collect();
        best.sort_unstable_by(|a, b| b.rssi.cmp(&a.rssi).then(a.minor.cmp(&b.minor)));
        best.truncate(max);
        best
    }

    /// Look up a resident beacon
    pub fn get(&self, minor: u16) -> Option<&BeaconObservation> {
        self.entries.get(&minor)
    }

    /// Resident beacon count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No resident beacons
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every slot taken
    pub fn is_full(&self) -> bool {
        self.entries.len() == BEACON_TABLE_CAPACITY
    }

    /// Current error set
    pub fn errors(&self) -> BeaconErrors {
        self.errors
    }

    /// Add an error kind
    pub fn raise(&mut self, error: BeaconErrors) {
        self.errors.insert(error);
    }

    /// Clear all error kinds
    pub fn clear_errors(&mut self) {
        self.errors = BeaconErrors::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sighting(minor: u16, rssi: i8, at: u32) -> BeaconObservation {
        BeaconObservation {
            major: 0x0001,
            minor,
            rssi,
            extra: 0,
            last_seen_at_secs: at,
        }
    }

    #[test]
    fn test_observe_insert_then_update() {
        let mut table = BeaconTable::new();
        assert_eq!(table.observe(sighting(7, -80, 1)), ObserveOutcome::Inserted);
        assert_eq!(table.observe(sighting(7, -60, 2)), ObserveOutcome::Updated);

        assert_eq!(table.len(), 1);
        let entry = table.get(7).unwrap();
        assert_eq!(entry.rssi, -60);
        assert_eq!(entry.last_seen_at_secs, 2);
    }

    #[test]
    fn test_capacity_truncation_sets_table_full() {
        let mut table = BeaconTable::new();
        for minor in 0..20u16 {
            table.observe(sighting(minor, -70, 1));
        }

        assert_eq!(table.len(), BEACON_TABLE_CAPACITY);
        assert!(table.errors().contains(BeaconErrors::TABLE_FULL));
        assert!(table.get(15).is_some());
        assert!(table.get(16).is_none());
    }

    #[test]
    fn test_update_allowed_when_full() {
        let mut table = BeaconTable::new();
        for minor in 0..BEACON_TABLE_CAPACITY as u16 {
            table.observe(sighting(minor, -70, 1));
        }
        assert_eq!(table.observe(sighting(3, -40, 2)), ObserveOutcome::Updated);
        assert!(table.errors().is_empty());

        table.check_capacity();
        assert!(table.errors().contains(BeaconErrors::TABLE_FULL));
    }

    #[test]
    fn test_evict_stale() {
        let mut table = BeaconTable::new();
        table.observe(sighting(1, -70, 100));
        table.observe(sighting(2, -70, 350));
        table.observe(sighting(3, -70, 400));

        // Exactly at the timeout is kept
        assert_eq!(table.evict_stale(400, 50), 1);
        assert!(table.get(1).is_none());
        assert!(table.get(2).is_some());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_presence_hash_ignores_rssi() {
        let mut a = BeaconTable::new();
        let mut b = BeaconTable::new();
        for (minor, rssi) in [(10, -50), (20, -60), (30, -70)] {
            a.observe(sighting(minor, rssi, 1));
            b.observe(sighting(minor, rssi - 15, 2));
        }
        assert_eq!(a.presence_hash(), 60);
        assert_eq!(a.presence_hash(), b.presence_hash());

        b.observe(sighting(40, -90, 3));
        assert_ne!(a.presence_hash(), b.presence_hash());
    }

    #[test]
    fn test_presence_hash_wraps() {
        let mut table = BeaconTable::new();
        assert_eq!(table.presence_hash(), 0);
        table.observe(sighting(u16::MAX, -70, 1));
        table.observe(sighting(u16::MAX - 1, -70, 1));
        assert_eq!(table.presence_hash(), 2 * u32::from(u16::MAX) - 1);
    }

    #[test]
    fn test_strongest_sorted_and_truncated() {
        let mut table = BeaconTable::new();
        table.observe(sighting(1, -90, 1));
        table.observe(sighting(2, -40, 1));
        table.observe(sighting(3, -65, 1));
        table.observe(sighting(4, -55, 1));

        let best = table.strongest(3);
        let minors: Vec<u16, 4> = best.iter().map(|obs| obs.minor).collect();
        assert_eq!(minors.as_slice(), &[2, 4, 3]);

        assert_eq!(table.strongest(10).len(), 4);
        assert!(table.strongest(0).is_empty());
    }

    #[test]
    fn test_error_set_raise_and_clear() {
        let mut table = BeaconTable::new();
        table.raise(BeaconErrors::COMM_FAIL);
        assert_eq!(table.errors().bits(), 0x01);
        table.raise(BeaconErrors::TABLE_FULL);
        assert_eq!(table.errors().bits(), 0x03);
        table.clear_errors();
        assert!(table.errors().is_empty());
    }
}
