//! Mock application core

use loctrack_core::module::AppCore;
use loctrack_core::parameters::{ConfigStore, ParameterStore};

/// Application core with directly settable state
///
/// Parameters registered by modules land in `store`, so tests can override
/// them between rounds.
pub struct MockAppCore {
    /// Device activation state
    pub active: bool,
    /// Last movement reported by the motion detector
    pub last_moved_at: Option<u32>,
    /// Number of `force_uplink` requests
    pub force_uplink_count: u32,
    /// Backing parameter store
    pub store: ParameterStore,
}

impl MockAppCore {
    /// Active device that has never moved
    pub fn new() -> Self {
        Self {
            active: true,
            last_moved_at: None,
            force_uplink_count: 0,
            store: ParameterStore::new(),
        }
    }
}

impl Default for MockAppCore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppCore for MockAppCore {
    fn is_device_active(&self) -> bool {
        self.active
    }

    fn last_moved_at_secs(&self) -> Option<u32> {
        self.last_moved_at
    }

    fn force_uplink(&mut self) {
        self.force_uplink_count += 1;
    }

    fn config(&mut self) -> &mut dyn ConfigStore {
        &mut self.store
    }
}
