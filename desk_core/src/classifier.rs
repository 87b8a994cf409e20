//! Posture classification from a raw distance reading.
//!
//! The sensor sits above the desk surface, so a short distance means the
//! user is standing over it.

use crate::{Posture, Thresholds};

/// Classify a distance reading against the standing cutoff
///
/// The cutoff itself counts as standing. Every reading, including zero,
/// maps to a posture.
pub fn classify(distance: u32, thresholds: &Thresholds) -> Posture {
    if distance <= thresholds.standing_cutoff {
        Posture::Standing
    } else {
        Posture::Sitting
    }
}
