//! Per-posture dwell tracking.
//!
//! Each posture remembers the second at which it most recently became
//! current. Records are only meaningful for the current posture.

use crate::Posture;
use serde::{Deserialize, Serialize};

/// Start time of the latest occupancy of each posture
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DwellTracker {
    sitting_since: u64,
    standing_since: u64,
}

impl DwellTracker {
    /// Create a tracker with both records starting at `now`
    pub fn new(now: u64) -> Self {
        Self {
            sitting_since: now,
            standing_since: now,
        }
    }

    /// Record that `posture` became current at `now`
    pub fn mark(&mut self, posture: Posture, now: u64) {
        match posture {
            Posture::Sitting => self.sitting_since = now,
            Posture::Standing => self.standing_since = now,
        }
    }

    /// When the latest occupancy of `posture` began
    pub fn since(&self, posture: Posture) -> u64 {
        match posture {
            Posture::Sitting => self.sitting_since,
            Posture::Standing => self.standing_since,
        }
    }

    /// Seconds spent in `posture` as of `now`
    ///
    /// Saturates at zero if `now` precedes the record.
    pub fn elapsed(&self, posture: Posture, now: u64) -> u64 {
        now.saturating_sub(self.since(posture))
    }
}
