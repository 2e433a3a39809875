//! Detection validation and discrepancy classification.

use sa_core::{CountryProfile, RecordedSpeed};

use crate::Detection;

/// Absolute difference (in the country's unit) above which a recorded and a
/// detected limit disagree.  Covers rounding when the map records the limit
/// in the other unit system.
pub const DISCREPANCY_TOLERANCE: f64 = 5.0;

/// The detected limit if it can be trusted: confident enough and within the
/// country's plausible range.
pub fn validate_detection(
    detection: &Detection,
    confidence_threshold: f64,
    profile: &CountryProfile,
) -> Option<f64> {
    let value = detection.value?;
    if !value.is_finite() || detection.confidence < confidence_threshold {
        return None;
    }
    profile.is_plausible(value).then_some(value)
}

/// Decide whether the recorded speed tag and a validated detection disagree.
///
/// | recorded                | detected | discrepancy                    |
/// |-------------------------|----------|--------------------------------|
/// | numeric                 | some     | differs by more than tolerance |
/// | qualitative (no digits) | some     | yes                            |
/// | none                    | some     | yes (unrecorded sign)          |
/// | any                     | none     | no                             |
///
/// `detected` is in `profile.unit`; the recorded value is converted into it.
pub fn classify_discrepancy(
    recorded: Option<&str>,
    detected: Option<f64>,
    profile: &CountryProfile,
) -> bool {
    let Some(detected) = detected else {
        return false;
    };
    match recorded.and_then(|tag| RecordedSpeed::parse(tag, profile.unit)) {
        Some(speed) => match speed.value_in(profile.unit) {
            Some(recorded) => (recorded - detected).abs() > DISCREPANCY_TOLERANCE,
            None => true,
        },
        None => true,
    }
}
