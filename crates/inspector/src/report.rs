//! Report types produced by a compliance run.

use serde::Serialize;
use serde_json::Value;

/// Result of a single test, successful or not. One per table entry,
/// including entries skipped because a dependency failed.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub test_id: String,
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    pub recommendation: Option<String>,
}

impl TestResult {
    pub fn pass(test_id: &str, name: &str, duration_ms: u64) -> Self {
        TestResult {
            test_id: test_id.to_string(),
            name: name.to_string(),
            passed: true,
            duration_ms,
            error: None,
            expected: None,
            actual: None,
            recommendation: None,
        }
    }

    pub fn fail(test_id: &str, name: &str, duration_ms: u64, error: impl Into<String>) -> Self {
        TestResult {
            test_id: test_id.to_string(),
            name: name.to_string(),
            passed: false,
            duration_ms,
            error: Some(error.into()),
            expected: None,
            actual: None,
            recommendation: None,
        }
    }

    /// Synthetic result for a test skipped because its dependency failed.
    /// Never the source of an outbound call; duration is always zero.
    pub fn skipped(test_id: &str, name: &str, dependency: &str) -> Self {
        TestResult::fail(
            test_id,
            name,
            0,
            format!("Skipped: dependency '{}' failed", dependency),
        )
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_expectation(mut self, expected: Value, actual: Value) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }
}

/// Complete report for one run. Invariant:
/// `passed + failed == results.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub run_id: String,
    pub target_url: String,
    pub protocol: String,
    pub timestamp: String,
    pub duration_ms: u64,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub security_score: u32,
    pub results: Vec<TestResult>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_result_has_zero_duration() {
        let result = TestResult::skipped("b", "B", "a");
        assert!(!result.passed);
        assert_eq!(result.duration_ms, 0);
        assert_eq!(result.error.as_deref(), Some("Skipped: dependency 'a' failed"));
    }

    #[test]
    fn result_serializes_optional_fields_as_null() {
        let value = serde_json::to_value(TestResult::pass("t", "T", 12)).unwrap();
        assert!(value["error"].is_null());
        assert!(value["expected"].is_null());
        assert!(value["recommendation"].is_null());
        assert_eq!(value["duration_ms"], 12);
    }
}
