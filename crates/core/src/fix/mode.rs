//! Fix mode and receiver power mode selectors

/// Device must be still this long before `OnStop` acquires
pub const STATIONARY_SECS: u32 = 5 * 60;

/// When the fix engine attempts an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FixMode {
    /// Attempt every round
    #[default]
    Always = 0,
    /// Attempt when the device moved since the last fix
    WhileMoving = 1,
    /// Attempt when the device moved since the last fix and has since been
    /// still for [`STATIONARY_SECS`]
    OnStop = 2,
    /// Attempt only while demand shots remain
    OnDemand = 3,
}

impl FixMode {
    /// Decode a configuration value; unknown values clamp to `OnDemand`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => FixMode::Always,
            1 => FixMode::WhileMoving,
            2 => FixMode::OnStop,
            _ => FixMode::OnDemand,
        }
    }

    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn name(&self) -> &'static str {
        match self {
            FixMode::Always => "always",
            FixMode::WhileMoving => "while-moving",
            FixMode::OnStop => "on-stop",
            FixMode::OnDemand => "on-demand",
        }
    }
}

/// Receiver power strategy between rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GpsPowerMode {
    /// Power the receiver only for the acquisition window
    #[default]
    OnOff = 0,
    /// Keep the receiver powered (backup ephemeris kept hot)
    AlwaysOn = 1,
}

impl GpsPowerMode {
    /// Decode a configuration value; unknown values clamp to `AlwaysOn`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => GpsPowerMode::OnOff,
            _ => GpsPowerMode::AlwaysOn,
        }
    }
}
