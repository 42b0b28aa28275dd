//! Dehydration percentage estimation.
//!
//! Pure functions, used at completion time when the moderator does not
//! supply an explicit percentage.

/// Midpoint of the severe dehydration range (>6% body weight).
const SEVERE_PERCENT: f64 = 8.0;
/// Midpoint of the moderate dehydration range (3-6%).
const MODERATE_PERCENT: f64 = 4.5;
/// Midpoint of the mild dehydration range (1-2%).
const MILD_PERCENT: f64 = 1.5;

/// Map a severity tier label to its numeric midpoint.
///
/// Tier labels are free text; matching is by keyword, case-insensitive.
/// Unrecognized labels map to None and are excluded from the estimate.
fn tier_percent(severity: &str) -> Option<f64> {
    let severity = severity.to_lowercase();

    if severity.contains("severe") {
        Some(SEVERE_PERCENT)
    } else if severity.contains("moderate") {
        Some(MODERATE_PERCENT)
    } else if severity.contains("mild") {
        Some(MILD_PERCENT)
    } else {
        None
    }
}

/// Estimate a dehydration percentage from symptom severity tiers.
///
/// Returns the arithmetic mean of the tier midpoints over the symptoms
/// that matched a recognized tier. Returns 0 when nothing matches.
#[must_use]
pub fn estimate_percent<'a, I>(severities: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sum = 0.0;
    let mut matched = 0u32;

    for severity in severities {
        if let Some(percent) = tier_percent(severity) {
            sum += percent;
            matched += 1;
        }
    }

    if matched == 0 {
        return 0.0;
    }

    sum / f64::from(matched)
}

/// Fluid deficit in liters for a patient weight (kg) and dehydration
/// percentage.
#[must_use]
pub fn fluid_deficit(weight_kg: f64, percent: f64) -> f64 {
    weight_kg * percent * 0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_severe_symptoms() {
        let percent = estimate_percent(["severe", "severe"]);
        assert!((percent - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mild_and_severe_average() {
        let percent = estimate_percent(["mild", "severe"]);
        assert!((percent - 4.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_symptoms_yields_zero() {
        let percent = estimate_percent([]);
        assert!(percent.abs() < f64::EPSILON);
    }

    #[test]
    fn test_unrecognized_tier_yields_zero() {
        let percent = estimate_percent(["unknown"]);
        assert!(percent.abs() < f64::EPSILON);
    }

    #[test]
    fn test_unrecognized_tier_excluded_from_mean() {
        // "unknown" contributes to neither sum nor count
        let percent = estimate_percent(["unknown", "moderate"]);
        assert!((percent - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tier_matching_is_case_insensitive() {
        let percent = estimate_percent(["Severe", "MILD"]);
        assert!((percent - 4.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tier_matching_by_keyword() {
        // Free-text labels like "moderate (3-6%)" still match
        let percent = estimate_percent(["moderate (3-6%)"]);
        assert!((percent - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fluid_deficit() {
        let deficit = fluid_deficit(70.0, 5.0);
        assert!((deficit - 3.5).abs() < f64::EPSILON);
    }
}
