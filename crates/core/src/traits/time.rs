//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over different
//! time providers (Embassy, mock, etc.) to enable host testing without
//! embedded dependencies. Sensor modules reason in whole seconds of the
//! monotonic boot clock, so the trait exposes a seconds view as well.

use core::cell::Cell;

/// Platform-agnostic monotonic boot clock.
///
/// This trait abstracts over different time providers:
/// - `EmbassyTime` (in firmware crate) for embedded targets using Embassy
/// - `MockTime` for host testing with controllable time
///
/// # Example
///
/// ```
/// use loctrack_core::traits::{MockTime, TimeSource};
///
/// fn is_stale<T: TimeSource>(time: &T, last_seen_secs: u32, timeout_secs: u32) -> bool {
///     time.now_secs().saturating_sub(last_seen_secs) > timeout_secs
/// }
///
/// let time = MockTime::with_initial(600_000_000); // 600 s after boot
/// assert!(is_stale(&time, 100, 300));
/// assert!(!is_stale(&time, 400, 300));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns current time in whole seconds since system start.
    ///
    /// Saturates at `u32::MAX` (about 136 years of uptime).
    fn now_secs(&self) -> u32 {
        u32::try_from(self.now_ms() / 1000).unwrap_or(u32::MAX)
    }

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle potential overflow.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Clones share nothing: a module under test holds its own copy, so tests
/// that need to move time for a module should advance through the module's
/// accessor or construct the module after setting the time.
///
/// # Example
///
/// ```
/// use loctrack_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.advance_secs(90);
/// assert_eq!(time.now_secs(), 90);
/// assert_eq!(time.now_ms(), 90_000);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts
// where Cell is safe. The Send+Sync bounds on TimeSource trait
// are required for embedded contexts, but MockTime is not used there.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Sets the current time to an absolute number of seconds.
    pub fn set_secs(&self, secs: u32) {
        self.current_us.set(u64::from(secs) * 1_000_000);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advances the current time by whole seconds.
    pub fn advance_secs(&self, secs: u32) {
        self.advance(u64::from(secs) * 1_000_000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_secs(), 0);
    }

    #[test]
    fn mock_time_seconds_round_down() {
        let time = MockTime::new();
        time.set(1_999_999);
        assert_eq!(time.now_secs(), 1);

        time.set_secs(42);
        assert_eq!(time.now_secs(), 42);
        assert_eq!(time.now_ms(), 42_000);
    }

    #[test]
    fn mock_time_advance_secs() {
        let time = MockTime::with_initial(500_000);
        time.advance_secs(2);
        assert_eq!(time.now_us(), 2_500_000);
        assert_eq!(time.now_secs(), 2);
    }

    #[test]
    fn mock_time_elapsed_since_saturates() {
        let time = MockTime::new();
        time.set(1_000);

        // Reference is in the "future" - should saturate to 0
        assert_eq!(time.elapsed_since(5_000), 0);
        assert_eq!(time.elapsed_since(400), 600);
    }
}
