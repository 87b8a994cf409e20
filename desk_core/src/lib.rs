#![forbid(unsafe_code)]

//! Core domain model and control logic for the deskwatch posture controller.
//!
//! This crate provides:
//! - Domain types (postures, indicator colors, cycle reports)
//! - Posture classification and dwell tracking
//! - The transition and notification engine
//! - Device interfaces (clock, distance sensor, indicator)
//! - The fixed-cadence control loop

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod classifier;
pub mod dwell;
pub mod engine;
pub mod device;
pub mod monitor;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, Thresholds};
pub use classifier::classify;
pub use dwell::DwellTracker;
pub use engine::{evaluate, DeskState};
pub use device::{
    Clock, DistanceSensor, FileIndicator, FileSensor, Indicator, LogIndicator, ManualClock,
    RecordingIndicator, ScriptedSensor, SystemClock,
};
pub use monitor::Monitor;
