//! Transition and notification engine.
//!
//! Each cycle the engine compares the measured posture with the current
//! one and does exactly one of:
//!
//! 1. **Transition** - the posture changed. `notified` is cleared. Sitting
//!    down after a standing occupancy that never reached its goal shows the
//!    warning immediately; sitting down after one that did spends the
//!    standing credit instead. The new posture's dwell record starts now.
//! 2. **Stable sitting, not notified** - warn once the sitting dwell
//!    exceeds the grace period.
//! 3. **Stable standing, goal not met** - mark the goal met once the
//!    standing dwell exceeds the standing goal.
//!
//! A stable posture whose flag is already set produces no indicator write.

use crate::{Action, Decision, DwellTracker, IndicatorColor, Posture, Thresholds};
use serde::{Deserialize, Serialize};

/// Controller state owned by the control loop
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeskState {
    /// Current posture
    pub posture: Posture,
    /// Start of each posture's latest occupancy
    pub dwell: DwellTracker,
    /// Sitting warning already shown for the current sitting occupancy
    pub notified: bool,
    /// Standing goal met and not yet spent by sitting down
    pub standing_met: bool,
}

impl DeskState {
    /// Initial state: assumed sitting since `now`, nothing notified
    pub fn new(now: u64) -> Self {
        Self {
            posture: Posture::Sitting,
            dwell: DwellTracker::new(now),
            notified: false,
            standing_met: false,
        }
    }
}

/// Advance `state` by one cycle and decide what the indicator should show
pub fn evaluate(
    thresholds: &Thresholds,
    state: &mut DeskState,
    measured: Posture,
    now: u64,
) -> Decision {
    if measured != state.posture {
        return transition(state, measured, now);
    }

    match measured {
        Posture::Sitting if !state.notified => {
            let elapsed_secs = state.dwell.elapsed(Posture::Sitting, now);
            if elapsed_secs > thresholds.grace_period_secs {
                state.notified = true;
                tracing::debug!(
                    "Sitting for {}s exceeds grace period of {}s",
                    elapsed_secs,
                    thresholds.grace_period_secs
                );
                Decision::with_indicator(
                    Action::SittingWarning { elapsed_secs },
                    IndicatorColor::Warning,
                )
            } else {
                Decision::quiet(Action::Sitting { elapsed_secs })
            }
        }
        Posture::Standing if !state.standing_met => {
            let elapsed_secs = state.dwell.elapsed(Posture::Standing, now);
            if elapsed_secs > thresholds.standing_goal_secs {
                state.standing_met = true;
                tracing::debug!(
                    "Standing for {}s exceeds goal of {}s",
                    elapsed_secs,
                    thresholds.standing_goal_secs
                );
                Decision::with_indicator(
                    Action::StandingGoalMet { elapsed_secs },
                    IndicatorColor::GoalMet,
                )
            } else {
                Decision::quiet(Action::Standing { elapsed_secs })
            }
        }
        _ => Decision::quiet(Action::Steady),
    }
}

fn transition(state: &mut DeskState, to: Posture, now: u64) -> Decision {
    let from = state.posture;
    state.notified = false;

    let mut indicator = None;
    let mut standing_credit_spent = false;

    match to {
        Posture::Sitting => {
            if state.standing_met {
                state.standing_met = false;
                standing_credit_spent = true;
            } else {
                // Standing too briefly counts the same as not standing at all
                indicator = Some(IndicatorColor::Warning);
                state.notified = true;
            }
        }
        Posture::Standing => {}
    }

    state.dwell.mark(to, now);
    state.posture = to;

    Decision {
        action: Action::Transition {
            from,
            to,
            standing_credit_spent,
        },
        indicator,
    }
}
