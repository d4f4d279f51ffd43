//! Parameter Storage Types
//!
//! Provides core parameter types, the `ParameterStore`, and the
//! `ConfigStore` trait through which modules read their tunables.
//!
//! Reads are get-or-default: a missing key is registered with its default
//! on first access, and a stored value outside the caller's valid range is
//! clamped into that range. Configuration problems never surface as errors
//! to a sensor module.

use super::error::ParameterError;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 32;

/// Length of a 128-bit UUID parameter
pub const UUID_LEN: usize = 16;

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    /// 32-bit unsigned integer (timeouts, thresholds, enum selectors)
    Uint(u32),
    /// 128-bit identifier (iBeacon proximity UUID)
    Uuid([u8; UUID_LEN]),
}

/// Configuration collaborator used by sensor modules.
///
/// Every accessor is infallible from the caller's point of view: unknown
/// keys fall back to (and register) the default, and out-of-range stored
/// values are clamped into `[min, max]`.
pub trait ConfigStore {
    /// Get a `u32` tunable, registering `default` when absent.
    fn get_or_add_u32(&mut self, name: &str, default: u32, min: u32, max: u32) -> u32;

    /// Get a UUID tunable, registering `default` when absent.
    fn get_or_add_uuid(&mut self, name: &str, default: [u8; UUID_LEN]) -> [u8; UUID_LEN];

    /// Get a `u8` tunable, registering `default` when absent.
    fn get_or_add_u8(&mut self, name: &str, default: u8, min: u8, max: u8) -> u8 {
        let value = self.get_or_add_u32(name, default.into(), min.into(), max.into());
        u8::try_from(value).unwrap_or(max)
    }
}

/// In-memory parameter store
///
/// Holds the values the external configuration layer loaded from flash or
/// received by downlink. Persistence is handled outside this crate.
pub struct ParameterStore {
    parameters: FnvIndexMap<String<PARAM_NAME_LEN>, ParamValue, MAX_PARAMS>,
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            parameters: FnvIndexMap::new(),
        }
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let key = make_key(name).ok()?;
        self.parameters.get(&key)
    }

    /// Set the value of a registered parameter
    ///
    /// No range check is made here; ranges belong to the reader and are
    /// applied on access.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = make_key(name)?;
        let slot = self
            .parameters
            .get_mut(&key)
            .ok_or(ParameterError::InvalidConfig)?;
        *slot = value;
        Ok(())
    }

    /// Register a new parameter with its default value
    ///
    /// If the parameter already exists, this is a no-op (idempotent).
    pub fn register(&mut self, name: &str, default_value: ParamValue) -> Result<(), ParameterError> {
        let key = make_key(name)?;

        if self.parameters.contains_key(&key) {
            return Ok(());
        }

        self.parameters
            .insert(key, default_value)
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    /// Get total parameter count
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for ParameterStore {
    fn get_or_add_u32(&mut self, name: &str, default: u32, min: u32, max: u32) -> u32 {
        let default = default.clamp(min, max);
        match self.get(name) {
            Some(ParamValue::Uint(v)) => (*v).clamp(min, max),
            // Wrong type stored under this name: fall back without overwriting
            Some(_) => default,
            None => {
                // A full store still yields a usable value
                let _ = self.register(name, ParamValue::Uint(default));
                default
            }
        }
    }

    fn get_or_add_uuid(&mut self, name: &str, default: [u8; UUID_LEN]) -> [u8; UUID_LEN] {
        match self.get(name) {
            Some(ParamValue::Uuid(v)) => *v,
            Some(_) => default,
            None => {
                let _ = self.register(name, ParamValue::Uuid(default));
                default
            }
        }
    }
}

fn make_key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::<PARAM_NAME_LEN>::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_store_register_and_get() {
        let mut store = ParameterStore::new();
        store.register("TEST", ParamValue::Uint(42)).unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Uint(42)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parameter_store_set_unknown() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("UNKNOWN", ParamValue::Uint(1)),
            Err(ParameterError::InvalidConfig)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_parameter_store_name_too_long() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.register("THIS_NAME_IS_FAR_TOO_LONG", ParamValue::Uint(1)),
            Err(ParameterError::InvalidConfig)
        );
    }

    #[test]
    fn test_parameter_store_register_idempotent() {
        let mut store = ParameterStore::new();
        store.register("TEST", ParamValue::Uint(42)).unwrap();
        store.set("TEST", ParamValue::Uint(100)).unwrap();
        store.register("TEST", ParamValue::Uint(42)).unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Uint(100)));
    }

    #[test]
    fn test_full_store_still_yields_default() {
        let mut store = ParameterStore::new();
        let names = [
            "P00", "P01", "P02", "P03", "P04", "P05", "P06", "P07", "P08", "P09", "P10", "P11",
            "P12", "P13", "P14", "P15", "P16", "P17", "P18", "P19", "P20", "P21", "P22", "P23",
            "P24", "P25", "P26", "P27", "P28", "P29", "P30", "P31",
        ];
        for name in names {
            store.register(name, ParamValue::Uint(0)).unwrap();
        }
        assert_eq!(
            store.register("EXTRA", ParamValue::Uint(0)),
            Err(ParameterError::StoreFull)
        );
        assert_eq!(store.get_or_add_u32("GPS_WARM_SECS", 60, 1, 900), 60);
        assert_eq!(store.get("GPS_WARM_SECS"), None);
    }

    #[test]
    fn test_get_or_add_registers_default() {
        let mut store = ParameterStore::new();
        assert_eq!(store.get_or_add_u32("GPS_COLD_SECS", 120, 10, 900), 120);
        assert_eq!(store.get("GPS_COLD_SECS"), Some(&ParamValue::Uint(120)));
    }

    #[test]
    fn test_get_or_add_clamps_out_of_range() {
        let mut store = ParameterStore::new();
        store.register("GPS_COLD_SECS", ParamValue::Uint(5)).unwrap();
        assert_eq!(store.get_or_add_u32("GPS_COLD_SECS", 120, 10, 900), 10);

        store.set("GPS_COLD_SECS", ParamValue::Uint(5000)).unwrap();
        assert_eq!(store.get_or_add_u32("GPS_COLD_SECS", 120, 10, 900), 900);

        // Stored value is left untouched; clamping is a read-side view
        assert_eq!(store.get("GPS_COLD_SECS"), Some(&ParamValue::Uint(5000)));
    }

    #[test]
    fn test_get_or_add_u8_clamps() {
        let mut store = ParameterStore::new();
        store.register("BLE_MAX_NAV_UL", ParamValue::Uint(300)).unwrap();
        assert_eq!(store.get_or_add_u8("BLE_MAX_NAV_UL", 8, 1, 8), 8);
    }

    #[test]
    fn test_get_or_add_wrong_type_uses_default() {
        let mut store = ParameterStore::new();
        store.register("BLE_UUID", ParamValue::Uint(1)).unwrap();
        assert_eq!(store.get_or_add_uuid("BLE_UUID", [0xAA; UUID_LEN]), [0xAA; UUID_LEN]);
        assert_eq!(store.get_or_add_u32("BLE_UUID", 3, 0, 10), 1);
    }
}
