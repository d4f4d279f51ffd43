//! Fix Merge State
//!
//! Platform-agnostic bookkeeping for the fix acquisition engine:
//! the per-round attempt decision, timeout scaling, and the
//! precision-weighted merge of successive fixes.
//!
//! Per-round fields (held fix, good-fix count, comm failure) are reset when
//! a round actually attempts acquisition. The demand counter, the last
//! attempt time and the last fix time persist across rounds so that
//! stationary devices can skip pointless retries.

use super::mode::{FixMode, STATIONARY_SECS};
use super::GpsFix;

/// Fixes older than this are treated as absent for timeout scaling
const MAX_WARM_FIX_AGE_MINS: u32 = 24 * 60;

/// Why a round skipped acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Previous attempt found nothing and the device has not moved since
    NoMovementSinceFailedAttempt,
    /// `WhileMoving`/`OnStop` movement conditions not met
    MotionCondition,
    /// `OnDemand` without outstanding demand shots
    NoDemand,
}

impl SkipReason {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoMovementSinceFailedAttempt => "no movement since failed attempt",
            SkipReason::MotionCondition => "motion condition not met",
            SkipReason::NoDemand => "no demand outstanding",
        }
    }
}

/// Result of the once-per-round attempt policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptDecision {
    /// Start acquisition this round
    Attempt,
    /// Stay idle this round
    Skip(SkipReason),
}

/// Fix merge and attempt bookkeeping
#[derive(Debug, Clone, Default)]
pub struct MergeState {
    /// Best fix of the current (or most recent attempted) round
    held: Option<GpsFix>,
    /// Acceptable merges this round
    good_fix_count: u32,
    /// Remaining forced-acquisition rounds
    demand_shots: u8,
    /// Boot-clock second of the most recent attempt
    last_attempt_at: Option<u32>,
    /// Capture time of the most recently held fix, kept across rounds
    last_fix_at: Option<u32>,
    /// Receiver failed to communicate this round
    comm_failed: bool,
}

impl MergeState {
    /// Create an empty state (const fn for static initialization).
    pub const fn new() -> Self {
        Self {
            held: None,
            good_fix_count: 0,
            demand_shots: 0,
            last_attempt_at: None,
            last_fix_at: None,
            comm_failed: false,
        }
    }

    /// Best fix held, if any
    pub fn held(&self) -> Option<&GpsFix> {
        self.held.as_ref()
    }

    /// Acceptable merges in the current round
    pub fn good_fix_count(&self) -> u32 {
        self.good_fix_count
    }

    /// Outstanding demand shots
    pub fn demand_shots(&self) -> u8 {
        self.demand_shots
    }

    /// Replace the outstanding demand shots
    pub fn set_demand_shots(&mut self, shots: u8) {
        self.demand_shots = shots;
    }

    /// Boot-clock second of the most recent attempt
    pub fn last_attempt_at(&self) -> Option<u32> {
        self.last_attempt_at
    }

    /// Capture time of the last held fix (persists across rounds)
    pub fn last_fix_at(&self) -> Option<u32> {
        self.last_fix_at
    }

    /// Whether the receiver reported a comm failure this round
    pub fn comm_failed(&self) -> bool {
        self.comm_failed
    }

    /// Record a receiver comm failure for this round
    pub fn record_comm_failure(&mut self) {
        self.comm_failed = true;
    }

    /// Decide whether this round should acquire.
    ///
    /// Consumes one demand shot when `OnDemand` decides to attempt. A
    /// previous attempt that produced no fix suppresses the attempt in every
    /// mode until the device reports movement after that attempt.
    ///
    /// # Arguments
    ///
    /// * `mode` - Configured fix mode
    /// * `now_secs` - Current boot-clock second
    /// * `last_moved_at` - Last movement reported by the motion detector
    pub fn decide(
        &mut self,
        mode: FixMode,
        now_secs: u32,
        last_moved_at: Option<u32>,
    ) -> AttemptDecision {
        if self.held.is_none() {
            if let Some(attempt_at) = self.last_attempt_at {
                if !moved_since(last_moved_at, Some(attempt_at)) {
                    return AttemptDecision::Skip(SkipReason::NoMovementSinceFailedAttempt);
                }
            }
        }

        let moved_since_fix = moved_since(last_moved_at, self.last_fix_at);
        match mode {
            FixMode::Always => AttemptDecision::Attempt,
            FixMode::WhileMoving => {
                if moved_since_fix {
                    AttemptDecision::Attempt
                } else {
                    AttemptDecision::Skip(SkipReason::MotionCondition)
                }
            }
            FixMode::OnStop => {
                let stationary = last_moved_at
                    .map_or(true, |moved| now_secs.saturating_sub(moved) >= STATIONARY_SECS);
                if moved_since_fix && stationary {
                    AttemptDecision::Attempt
                } else {
                    AttemptDecision::Skip(SkipReason::MotionCondition)
                }
            }
            FixMode::OnDemand => {
                if self.demand_shots > 0 {
                    self.demand_shots -= 1;
                    AttemptDecision::Attempt
                } else {
                    AttemptDecision::Skip(SkipReason::NoDemand)
                }
            }
        }
    }

    /// Reset per-round fields at the start of an attempted round
    pub fn begin_acquisition(&mut self, now_secs: u32) {
        self.held = None;
        self.good_fix_count = 0;
        self.comm_failed = false;
        self.last_attempt_at = Some(now_secs);
    }

    /// Acquisition budget in seconds.
    ///
    /// Without a fix, or with one older than 24 h, the cold timeout applies.
    /// Otherwise the warm timeout grows by one second per 24 minutes of fix
    /// age.
    pub fn acquisition_timeout_secs(&self, now_secs: u32, cold_secs: u32, warm_secs: u32) -> u32 {
        let age_mins = self
            .last_fix_at
            .map(|captured| now_secs.saturating_sub(captured) / 60);

        match age_mins {
            Some(age) if age <= MAX_WARM_FIX_AGE_MINS => warm_secs + age / 24,
            _ => cold_secs,
        }
    }

    /// Merge a candidate fix into the held fix.
    ///
    /// Returns whether an acceptable result exists after merging; every
    /// acceptable merge counts as a good fix for this round.
    ///
    /// 1. No held fix: adopt the candidate (acceptable iff it meets threshold).
    /// 2. Held fix below standard and candidate strictly more precise: replace.
    /// 3. Candidate meets threshold: component-wise mean, candidate time and
    ///    satellite count.
    /// 4. Otherwise: discard, no change.
    pub fn merge_new_fix(&mut self, candidate: GpsFix, threshold: i32) -> bool {
        let acceptable = match self.held {
            None => {
                self.held = Some(candidate);
                candidate.meets(threshold)
            }
            Some(held) if !held.meets(threshold) && candidate.precision < held.precision => {
                self.held = Some(candidate);
                candidate.meets(threshold)
            }
            Some(held) if candidate.meets(threshold) => {
                self.held = Some(GpsFix {
                    latitude: mean(held.latitude, candidate.latitude),
                    longitude: mean(held.longitude, candidate.longitude),
                    altitude: mean(held.altitude, candidate.altitude),
                    precision: mean(held.precision, candidate.precision),
                    captured_at_secs: candidate.captured_at_secs,
                    satellite_count: candidate.satellite_count,
                });
                true
            }
            Some(_) => return false,
        };

        self.last_fix_at = self.held.map(|fix| fix.captured_at_secs);
        if acceptable {
            self.good_fix_count = self.good_fix_count.saturating_add(1);
        }
        acceptable
    }
}

/// Truncating mean without intermediate overflow
fn mean(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

/// Never having a reference point counts as movement
fn moved_since(last_moved_at: Option<u32>, reference: Option<u32>) -> bool {
    match (reference, last_moved_at) {
        (None, _) => true,
        (Some(at), Some(moved)) => moved > at,
        (Some(_), None) => false,
    }
}
