//! Platform time sources
//!
//! Re-exports the core `TimeSource` trait and provides the Embassy
//! implementation for embedded targets.

pub use loctrack_core::traits::{MockTime, TimeSource};

/// Embassy-based time source using the Embassy time driver.
///
/// Uses `embassy_time::Instant`, which counts from boot, matching the
/// monotonic boot clock the sensor modules expect.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

#[cfg(feature = "embassy")]
impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
