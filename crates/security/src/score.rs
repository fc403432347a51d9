//! Scoring and grading.
//!
//! Score is the earned share of registered weight, truncated to an
//! integer. An empty evaluated-check set is a vacuous pass (100). Grade
//! boundaries are inclusive at the lower edge.

use crate::analyze::SecurityCheck;
use crate::registry::{spec_for, Severity};

/// Weighted score over the evaluated checks, 0-100.
///
/// Only checks whose id is in the registry count toward either side of
/// the ratio; integer division truncates.
pub fn calculate_security_score(checks: &[SecurityCheck]) -> u32 {
    let total_weight: u32 = checks
        .iter()
        .filter_map(|c| spec_for(&c.check_id))
        .map(|s| s.weight)
        .sum();

    if total_weight == 0 {
        return 100;
    }

    let earned_weight: u32 = checks
        .iter()
        .filter(|c| c.passed)
        .filter_map(|c| spec_for(&c.check_id))
        .map(|s| s.weight)
        .sum();

    earned_weight * 100 / total_weight
}

/// Letter grade for a score. Lower bounds are inclusive: 90 is an A,
/// 89 a B, and so on down to F below 60.
pub fn grade_for(score: u32) -> &'static str {
    match score {
        90.. => "A",
        80..=89 => "B",
        70..=79 => "C",
        60..=69 => "D",
        _ => "F",
    }
}

/// Human-readable one-line summary of an analysis.
pub fn summarize(checks: &[SecurityCheck], score: u32) -> String {
    let critical_failures = checks
        .iter()
        .filter(|c| !c.passed && c.severity == Severity::Critical)
        .count();
    let high_failures = checks
        .iter()
        .filter(|c| !c.passed && c.severity == Severity::High)
        .count();

    if score >= 90 {
        "Excellent! All critical security checks passed.".to_string()
    } else if score >= 70 {
        if critical_failures > 0 {
            format!("Warning: {} critical check(s) failed.", critical_failures)
        } else {
            format!(
                "Good, but {} high-severity check(s) need attention.",
                high_failures
            )
        }
    } else {
        format!(
            "Security concerns: {} critical and {} high-severity failures.",
            critical_failures, high_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Severity;

    fn check(id: &str, passed: bool) -> SecurityCheck {
        SecurityCheck {
            check_id: id.to_string(),
            name: id.to_string(),
            passed,
            severity: spec_for(id).map(|s| s.severity).unwrap_or(Severity::Low),
            message: String::new(),
            recommendation: None,
        }
    }

    #[test]
    fn all_passed_scores_one_hundred() {
        let checks: Vec<SecurityCheck> = crate::registry::SECURITY_CHECKS
            .iter()
            .map(|s| check(s.id, true))
            .collect();
        assert_eq!(calculate_security_score(&checks), 100);
    }

    #[test]
    fn no_checks_is_a_vacuous_pass() {
        assert_eq!(calculate_security_score(&[]), 100);
    }

    #[test]
    fn unregistered_ids_contribute_nothing() {
        let checks = vec![check("nonce_unique", true), check("made_up", false)];
        assert_eq!(calculate_security_score(&checks), 100);

        let only_unknown = vec![check("made_up", false)];
        assert_eq!(calculate_security_score(&only_unknown), 100);
    }

    #[test]
    fn score_truncates_toward_zero() {
        // signature_present (20) passed out of {20, 25} evaluated:
        // 20 * 100 / 45 = 44.44 -> 44.
        let checks = vec![check("signature_present", true), check("nonce_unique", false)];
        assert_eq!(calculate_security_score(&checks), 44);
    }

    #[test]
    fn score_is_monotone_in_passed_checks() {
        let mut checks: Vec<SecurityCheck> = crate::registry::SECURITY_CHECKS
            .iter()
            .map(|s| check(s.id, false))
            .collect();

        let mut previous = calculate_security_score(&checks);
        for i in 0..checks.len() {
            checks[i].passed = true;
            let next = calculate_security_score(&checks);
            assert!(next >= previous);
            previous = next;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn grade_boundaries_are_inclusive() {
        let cases = [
            (100, "A"),
            (90, "A"),
            (89, "B"),
            (80, "B"),
            (79, "C"),
            (70, "C"),
            (69, "D"),
            (60, "D"),
            (59, "F"),
            (0, "F"),
        ];
        for (score, grade) in cases {
            assert_eq!(grade_for(score), grade, "score {}", score);
        }
    }

    #[test]
    fn summary_reflects_failure_severity() {
        let all_pass: Vec<SecurityCheck> = crate::registry::SECURITY_CHECKS
            .iter()
            .map(|s| check(s.id, true))
            .collect();
        assert_eq!(
            summarize(&all_pass, 100),
            "Excellent! All critical security checks passed."
        );

        // One critical failure in the 70..90 band.
        let mixed = vec![
            check("signature_present", true),
            check("signature_format", true),
            check("nonce_unique", false),
            check("time_window", true),
            check("amount_match", true),
            check("recipient_match", true),
        ];
        let score = calculate_security_score(&mixed);
        assert_eq!(score, 75);
        assert_eq!(summarize(&mixed, score), "Warning: 1 critical check(s) failed.");
    }
}
