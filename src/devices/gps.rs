//! Satellite receiver manager contract
//!
//! The manager owns the serial link and sentence parsing. It reports
//! progress through [`GpsEvent`], delivered to the fix engine one at a
//! time and in emission order.

use loctrack_core::fix::{GpsFix, GpsPowerMode};

/// Asynchronous receiver events.
///
/// Matched exhaustively by the fix engine: a new variant does not compile
/// until the engine handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsEvent {
    /// Receiver did not answer on its transport
    CommFail,
    /// Receiver answered
    CommOk,
    /// Satellite lock obtained
    SatelliteLocked,
    /// A position solution was produced
    NewFix(GpsFix),
    /// Satellite lock lost; the receiver gave up
    SatelliteLost,
    /// Receiver-side acquisition ended
    Done,
}

impl GpsEvent {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            GpsEvent::CommFail => "comm-fail",
            GpsEvent::CommOk => "comm-ok",
            GpsEvent::SatelliteLocked => "sat-lock",
            GpsEvent::NewFix(_) => "new-fix",
            GpsEvent::SatelliteLost => "sat-loss",
            GpsEvent::Done => "done",
        }
    }
}

/// Receiver manager operations used by the fix engine
///
/// # Invariants
///
/// - At most one acquisition in flight per receiver
/// - `stop()` and `power_off()` are safe to call when idle
pub trait GpsReceiver {
    /// Apply the power strategy for subsequent acquisitions
    fn set_power_mode(&mut self, mode: GpsPowerMode);

    /// Begin acquisition.
    ///
    /// `timeout_secs` of `None` disables the receiver-side timeout; the
    /// caller then decides alone when acquisition ends.
    fn start(&mut self, timeout_secs: Option<u32>);

    /// End acquisition (receiver may stay powered per power mode)
    fn stop(&mut self);

    /// Cut receiver power unconditionally
    fn power_off(&mut self);
}
