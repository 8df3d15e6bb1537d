//! Score-rate plausibility, shared by the submission validator and the
//! autopilot lab.

use crate::constants::{ANTI_CHEAT_THRESHOLD, MAX_POINTS_PER_SECOND, MIN_SESSION_SECS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaceVerdict {
    /// Score is low enough that pace is not checked.
    Unchecked,
    Plausible,
    /// Less than the minimum session length has elapsed.
    TooSoon,
    /// More points per second than the game can award.
    TooFast,
}

impl PaceVerdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Unchecked | Self::Plausible)
    }
}

pub fn check_pace(score: f64, elapsed_secs: f64) -> PaceVerdict {
    if score <= f64::from(ANTI_CHEAT_THRESHOLD) {
        return PaceVerdict::Unchecked;
    }
    if elapsed_secs < MIN_SESSION_SECS {
        return PaceVerdict::TooSoon;
    }
    if score / elapsed_secs > MAX_POINTS_PER_SECOND {
        return PaceVerdict::TooFast;
    }
    PaceVerdict::Plausible
}
