//! Core domain types for the deskwatch controller.
//!
//! This module defines the values that flow through one control cycle:
//! - Postures and indicator colors
//! - Engine decisions
//! - Per-cycle reports emitted by the control loop

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Posture
// ============================================================================

/// Desk posture derived from a distance reading
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Sitting,
    Standing,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Sitting => "sitting",
            Posture::Standing => "standing",
        }
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Indicator
// ============================================================================

/// Colors the indicator can show
///
/// Only `Warning` and `GoalMet` are driven by the engine. `Idle` is the
/// reserved third output value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    /// Red: sat too long, or stood too briefly
    Warning,
    /// Green: standing goal reached
    GoalMet,
    /// Blue: reserved
    Idle,
}

impl IndicatorColor {
    /// Discrete output value written to the indicator line
    pub fn code(&self) -> u8 {
        match self {
            IndicatorColor::Warning => 1,
            IndicatorColor::GoalMet => 2,
            IndicatorColor::Idle => 3,
        }
    }
}

impl fmt::Display for IndicatorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorColor::Warning => "warning",
            IndicatorColor::GoalMet => "goal_met",
            IndicatorColor::Idle => "idle",
        };
        f.pad(name)
    }
}

// ============================================================================
// Engine Decisions
// ============================================================================

/// What the engine did in one evaluation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Measured posture differed from the current one
    Transition {
        from: Posture,
        to: Posture,
        /// Set when sitting down after a standing occupancy that met its goal
        standing_credit_spent: bool,
    },
    /// Stable sitting, still within the grace period
    Sitting { elapsed_secs: u64 },
    /// Stable sitting crossed the grace period
    SittingWarning { elapsed_secs: u64 },
    /// Stable standing, goal not reached yet
    Standing { elapsed_secs: u64 },
    /// Stable standing crossed the standing goal
    StandingGoalMet { elapsed_secs: u64 },
    /// Stable posture whose flag is already set
    Steady,
}

/// Result of evaluating one cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    /// Color to write to the indicator, if any
    pub indicator: Option<IndicatorColor>,
}

impl Decision {
    pub fn quiet(action: Action) -> Self {
        Self {
            action,
            indicator: None,
        }
    }

    pub fn with_indicator(action: Action, color: IndicatorColor) -> Self {
        Self {
            action,
            indicator: Some(color),
        }
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.action, Action::Transition { .. })
    }
}

// ============================================================================
// Cycle Reports
// ============================================================================

/// Where the posture fed to the engine came from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    /// A successful sensor read
    Measured(u32),
    /// Sensor read failed; last known posture held
    Held,
    /// Too many consecutive failures; fallback posture forced
    Fallback,
}

/// Everything observable about one control-loop cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleReport {
    pub at_secs: u64,
    pub reading: Reading,
    pub posture: Posture,
    pub decision: Decision,
    /// True when the cadence wait was skipped after this cycle
    pub resampled: bool,
}
