//! Location Fix Types
//!
//! Pure data structures and algorithms for satellite fix acquisition.
//!
//! # Units
//!
//! - Latitude/longitude: 1e-7 degrees (signed)
//! - Altitude: decimeters
//! - Precision: 0.1 m, lower is better, negative means no usable fix
//! - Timestamps: seconds of the monotonic boot clock
//!
//! # Uplink Layout
//!
//! A fix is reported as a 22-byte little-endian record:
//! `status:u8, lat:i32, lon:i32, alt:i32, prec:i32, captured_at:u32, sats:u8`.
//! A failed round is reported as the status byte alone.

pub mod merge;
pub mod mode;

pub use merge::{AttemptDecision, MergeState, SkipReason};
pub use mode::{FixMode, GpsPowerMode, STATIONARY_SECS};

use crate::uplink::{EntryWriter, UplinkError};

/// Size of an encoded fix record
pub const GPS_RECORD_LEN: usize = 22;

/// Size of an encoded failure record
pub const GPS_FAILURE_RECORD_LEN: usize = 1;

/// Outcome status carried in every GPS uplink record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FixStatus {
    /// Fix acquired; the record carries coordinates
    Ok = 0,
    /// Receiver answered but no fix was obtained in the budget
    NoFix = 1,
    /// Receiver did not answer on its transport
    CommFail = 2,
}

impl FixStatus {
    /// Decode a status byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FixStatus::Ok),
            1 => Some(FixStatus::NoFix),
            2 => Some(FixStatus::CommFail),
            _ => None,
        }
    }

    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            FixStatus::Ok => "ok",
            FixStatus::NoFix => "no-fix",
            FixStatus::CommFail => "comm-fail",
        }
    }
}

/// Single positioning estimate from the satellite receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpsFix {
    /// Latitude in 1e-7 degrees
    pub latitude: i32,
    /// Longitude in 1e-7 degrees
    pub longitude: i32,
    /// Altitude in decimeters
    pub altitude: i32,
    /// Horizontal precision in 0.1 m (-1 = invalid)
    pub precision: i32,
    /// Boot-clock second at which the receiver produced the fix
    pub captured_at_secs: u32,
    /// Satellites used in the solution
    pub satellite_count: u8,
}

impl GpsFix {
    /// Whether this estimate carries a usable position
    ///
    /// The receiver marks unusable estimates with a negative precision, and
    /// a zero capture time means the fields were never filled in.
    pub fn is_usable(&self) -> bool {
        self.precision >= 0 && self.captured_at_secs != 0
    }

    /// Whether precision is strictly below `threshold`
    pub fn meets(&self, threshold: i32) -> bool {
        self.precision < threshold
    }

    /// Write the 22-byte uplink record into a reserved entry
    pub fn write_record(
        &self,
        status: FixStatus,
        out: &mut EntryWriter<'_>,
    ) -> Result<(), UplinkError> {
        out.put_u8(status as u8)?;
        out.put_i32_le(self.latitude)?;
        out.put_i32_le(self.longitude)?;
        out.put_i32_le(self.altitude)?;
        out.put_i32_le(self.precision)?;
        out.put_u32_le(self.captured_at_secs)?;
        out.put_u8(self.satellite_count)
    }

    /// Decode a 22-byte uplink record
    ///
    /// Returns `None` if the buffer is not exactly a fix record or the
    /// status byte is unknown.
    pub fn from_record(buf: &[u8]) -> Option<(FixStatus, Self)> {
        if buf.len() != GPS_RECORD_LEN {
            return None;
        }
        let status = FixStatus::from_u8(buf[0])?;
        let i32_at = |at: usize| i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);

        Some((
            status,
            Self {
                latitude: i32_at(1),
                longitude: i32_at(5),
                altitude: i32_at(9),
                precision: i32_at(13),
                captured_at_secs: u32::from_le_bytes([buf[17], buf[18], buf[19], buf[20]]),
                satellite_count: buf[21],
            },
        ))
    }
}
