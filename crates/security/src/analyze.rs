//! Analyzer entry points, one per message family.
//!
//! Each call runs its checks in a fixed order, scores the outcome against
//! the shared registry, and returns a fresh [`SecurityAnalysis`]. A check
//! whose subject field is absent is skipped entirely and contributes
//! neither weight nor failure.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::registry::Severity;
use crate::score::{calculate_security_score, grade_for, summarize};
use crate::verify::{verify_eip712_signature, verify_nonce, verify_time_window};

/// Result of a single security check.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityCheck {
    pub check_id: String,
    pub name: String,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
    pub recommendation: Option<String>,
}

impl SecurityCheck {
    fn pass(check_id: &str, name: &str, severity: Severity, message: impl Into<String>) -> Self {
        SecurityCheck {
            check_id: check_id.to_string(),
            name: name.to_string(),
            passed: true,
            severity,
            message: message.into(),
            recommendation: None,
        }
    }

    fn fail(
        check_id: &str,
        name: &str,
        severity: Severity,
        message: impl Into<String>,
        recommendation: &str,
    ) -> Self {
        SecurityCheck {
            check_id: check_id.to_string(),
            name: name.to_string(),
            passed: false,
            severity,
            message: message.into(),
            recommendation: Some(recommendation.to_string()),
        }
    }
}

/// Complete security analysis result. Derived, never stored; recomputed
/// per request.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityAnalysis {
    pub score: u32,
    pub grade: String,
    pub checks: Vec<SecurityCheck>,
    pub summary: String,
    pub timestamp: String,
}

fn finish(checks: Vec<SecurityCheck>) -> SecurityAnalysis {
    let score = calculate_security_score(&checks);
    let grade = grade_for(score).to_string();
    let summary = summarize(&checks, score);
    SecurityAnalysis {
        score,
        grade,
        checks,
        summary,
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    }
}

/// Read a field that may arrive as a JSON string or number, as a string.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an atomic-unit amount from a string or number field; absent or
/// malformed values count as zero rather than aborting the analysis.
fn amount_field(value: &Value, key: &str) -> i128 {
    string_field(value, key)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Analyze an x402 v2 payment payload against its requirements.
///
/// Runs all six registered checks. `used_nonces` is the caller's replay
/// set; pass an empty set when no history is tracked.
pub fn analyze_x402_payment(
    payload: &Value,
    requirements: &Value,
    used_nonces: &HashSet<String>,
) -> SecurityAnalysis {
    let mut checks: Vec<SecurityCheck> = Vec::new();
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let inner = payload.get("payload").cloned().unwrap_or(Value::Null);
    let signature = inner
        .get("signature")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let authorization = inner.get("authorization").cloned().unwrap_or(Value::Null);

    // Check 1: signature present.
    if !signature.is_empty() {
        checks.push(SecurityCheck::pass(
            "signature_present",
            "Signature Present",
            Severity::Critical,
            "Payment includes cryptographic signature",
        ));
    } else {
        checks.push(SecurityCheck::fail(
            "signature_present",
            "Signature Present",
            Severity::Critical,
            "Missing signature in payment payload",
            "Include a valid EIP-712 signature",
        ));
    }

    // Check 2: signature format. Skipped when there is no signature.
    if !signature.is_empty() {
        let eval = verify_eip712_signature(&signature, &authorization);
        checks.push(if eval.passed {
            SecurityCheck::pass(
                "signature_format",
                "Valid Signature Format",
                Severity::High,
                eval.message,
            )
        } else {
            SecurityCheck::fail(
                "signature_format",
                "Valid Signature Format",
                Severity::High,
                eval.message,
                "Use proper EIP-712 signature format",
            )
        });
    }

    // Check 3: nonce uniqueness. Skipped when no nonce field is present.
    let nonce = authorization
        .get("nonce")
        .and_then(Value::as_str)
        .unwrap_or("");
    if !nonce.is_empty() {
        let eval = verify_nonce(nonce, used_nonces);
        checks.push(if eval.passed {
            SecurityCheck::pass("nonce_unique", "Unique Nonce", Severity::Critical, eval.message)
        } else {
            SecurityCheck::fail(
                "nonce_unique",
                "Unique Nonce",
                Severity::Critical,
                eval.message,
                "Generate a unique 32-byte nonce for each payment",
            )
        });
    }

    // Check 4: time window. Missing bounds default to an open window.
    let valid_after = string_field(&authorization, "validAfter").unwrap_or_else(|| "0".to_string());
    let valid_before =
        string_field(&authorization, "validBefore").unwrap_or_else(|| (now + 300).to_string());
    let eval = verify_time_window(&valid_after, &valid_before, now);
    checks.push(if eval.passed {
        SecurityCheck::pass("time_window", "Valid Time Window", Severity::High, eval.message)
    } else {
        SecurityCheck::fail(
            "time_window",
            "Valid Time Window",
            Severity::High,
            eval.message,
            "Set appropriate validAfter/validBefore timestamps",
        )
    });

    // Check 5: authorized amount covers the required amount.
    let auth_value = amount_field(&authorization, "value");
    let required_amount = amount_field(requirements, "amount");
    let amount_ok = auth_value >= required_amount;
    let message = format!(
        "Amount {} {} required {}",
        auth_value,
        if amount_ok { ">=" } else { "<" },
        required_amount
    );
    checks.push(if amount_ok {
        SecurityCheck::pass("amount_match", "Amount Matches", Severity::Medium, message)
    } else {
        SecurityCheck::fail(
            "amount_match",
            "Amount Matches",
            Severity::Medium,
            message,
            &format!("Increase payment amount to at least {}", required_amount),
        )
    });

    // Check 6: recipient address matches, case-insensitively.
    let auth_to = authorization.get("to").and_then(Value::as_str).unwrap_or("");
    let required_to = requirements
        .get("payTo")
        .and_then(Value::as_str)
        .unwrap_or("");
    let recipient_ok =
        !auth_to.is_empty() && !required_to.is_empty() && auth_to.eq_ignore_ascii_case(required_to);
    checks.push(if recipient_ok {
        SecurityCheck::pass(
            "recipient_match",
            "Recipient Matches",
            Severity::Critical,
            "Recipient matches required address",
        )
    } else {
        SecurityCheck::fail(
            "recipient_match",
            "Recipient Matches",
            Severity::Critical,
            "Recipient does NOT match required address",
            &format!("Set 'to' address to {}", required_to),
        )
    });

    finish(checks)
}

/// Analyze an AP2 mandate for security issues.
///
/// Three mandate-structure checks reuse registry ids so scores stay
/// comparable with the micropayment analyzer: content hash stands in for
/// `signature_format`, merchant authorization for `recipient_match`.
pub fn analyze_ap2_mandate(mandate: &Value, authorization: &str) -> SecurityAnalysis {
    let mut checks: Vec<SecurityCheck> = Vec::new();

    // Check 1: user authorization present.
    if !authorization.is_empty() {
        checks.push(SecurityCheck::pass(
            "signature_present",
            "User Authorization Present",
            Severity::Critical,
            "Mandate includes user authorization",
        ));
    } else {
        checks.push(SecurityCheck::fail(
            "signature_present",
            "User Authorization Present",
            Severity::Critical,
            "Missing user authorization",
            "User must sign the mandate before payment",
        ));
    }

    // Check 2: mandate contents are hash-bound.
    let content_hash = mandate
        .get("content_hash")
        .and_then(Value::as_str)
        .unwrap_or("");
    if !content_hash.is_empty() {
        checks.push(SecurityCheck::pass(
            "signature_format",
            "Content Hash Present",
            Severity::High,
            "Mandate contents are hashed for integrity",
        ));
    } else {
        checks.push(SecurityCheck::fail(
            "signature_format",
            "Content Hash Present",
            Severity::High,
            "Missing content hash",
            "Include SHA-256 hash of mandate contents",
        ));
    }

    // Check 3: merchant has signed the cart.
    let merchant_auth = mandate
        .get("merchant_authorization")
        .and_then(Value::as_str)
        .unwrap_or("");
    if !merchant_auth.is_empty() {
        checks.push(SecurityCheck::pass(
            "recipient_match",
            "Merchant Authorization",
            Severity::Critical,
            "Merchant has signed the cart mandate",
        ));
    } else {
        checks.push(SecurityCheck::fail(
            "recipient_match",
            "Merchant Authorization",
            Severity::Critical,
            "Missing merchant authorization",
            "Merchant must sign cart before user approval",
        ));
    }

    finish(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repeat_hex(len: usize) -> String {
        let mut s = String::from("0x");
        while s.len() < len {
            s.push('b');
        }
        s
    }

    fn valid_payload(to: &str) -> Value {
        json!({
            "x402Version": 1,
            "scheme": "exact",
            "network": "eip155:84532",
            "payload": {
                "signature": repeat_hex(132),
                "authorization": {
                    "from": repeat_hex(42),
                    "to": to,
                    "value": "10000",
                    "validAfter": "0",
                    "validBefore": "99999999999",
                    "nonce": repeat_hex(66),
                },
            },
        })
    }

    #[test]
    fn fully_valid_payment_scores_one_hundred() {
        let to = repeat_hex(42);
        let payload = valid_payload(&to);
        let requirements = json!({"amount": "10000", "payTo": to});

        let analysis = analyze_x402_payment(&payload, &requirements, &HashSet::new());
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.grade, "A");
        assert_eq!(analysis.checks.len(), 6);
        assert!(analysis.checks.iter().all(|c| c.passed));
        assert_eq!(analysis.summary, "Excellent! All critical security checks passed.");
    }

    #[test]
    fn recipient_comparison_is_case_insensitive() {
        let to_lower = repeat_hex(42);
        let to_upper = to_lower.to_uppercase().replace("0X", "0x");
        let payload = valid_payload(&to_lower);
        let requirements = json!({"amount": "10000", "payTo": to_upper});

        let analysis = analyze_x402_payment(&payload, &requirements, &HashSet::new());
        let recipient = analysis
            .checks
            .iter()
            .find(|c| c.check_id == "recipient_match")
            .unwrap();
        assert!(recipient.passed);
    }

    #[test]
    fn replayed_nonce_fails_the_nonce_check() {
        let to = repeat_hex(42);
        let payload = valid_payload(&to);
        let requirements = json!({"amount": "10000", "payTo": to});
        let mut used = HashSet::new();
        used.insert(repeat_hex(66));

        let analysis = analyze_x402_payment(&payload, &requirements, &used);
        let nonce = analysis
            .checks
            .iter()
            .find(|c| c.check_id == "nonce_unique")
            .unwrap();
        assert!(!nonce.passed);
        assert!(nonce.message.contains("replay"));
        // 25 of 100 lost: 75, grade C.
        assert_eq!(analysis.score, 75);
        assert_eq!(analysis.grade, "C");
    }

    #[test]
    fn missing_signature_skips_format_check() {
        let payload = json!({"payload": {"authorization": {}}});
        let requirements = json!({});

        let analysis = analyze_x402_payment(&payload, &requirements, &HashSet::new());
        assert!(analysis
            .checks
            .iter()
            .all(|c| c.check_id != "signature_format"));
        assert!(analysis.checks.iter().all(|c| c.check_id != "nonce_unique"));
        // Evaluated: signature_present (fail), time_window (pass via open
        // window), amount_match (0 >= 0), recipient_match (fail).
        // Earned 25 of 60 -> 41.
        assert_eq!(analysis.score, 41);
        assert_eq!(analysis.grade, "F");
    }

    #[test]
    fn insufficient_amount_names_both_values() {
        let to = repeat_hex(42);
        let payload = valid_payload(&to);
        let requirements = json!({"amount": "20000", "payTo": to});

        let analysis = analyze_x402_payment(&payload, &requirements, &HashSet::new());
        let amount = analysis
            .checks
            .iter()
            .find(|c| c.check_id == "amount_match")
            .unwrap();
        assert!(!amount.passed);
        assert_eq!(amount.message, "Amount 10000 < required 20000");
        assert_eq!(
            amount.recommendation.as_deref(),
            Some("Increase payment amount to at least 20000")
        );
    }

    #[test]
    fn complete_mandate_scores_one_hundred() {
        let mandate = json!({
            "content_hash": "sha256:abc",
            "merchant_authorization": "jwt",
        });
        let analysis = analyze_ap2_mandate(&mandate, "user-signature");
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.grade, "A");
        assert_eq!(analysis.checks.len(), 3);
    }

    #[test]
    fn empty_mandate_scores_zero() {
        let analysis = analyze_ap2_mandate(&json!({}), "");
        assert_eq!(analysis.score, 0);
        assert_eq!(analysis.grade, "F");
        assert!(analysis.checks.iter().all(|c| !c.passed));
        assert_eq!(
            analysis.summary,
            "Security concerns: 2 critical and 1 high-severity failures."
        );
    }

    #[test]
    fn analysis_serializes_to_the_wire_shape() {
        let analysis = analyze_ap2_mandate(&json!({}), "sig");
        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value["score"].is_u64());
        assert!(value["grade"].is_string());
        assert!(value["checks"].is_array());
        assert!(value["timestamp"].is_string());
        // Failed checks carry a recommendation, passed checks a null.
        let checks = value["checks"].as_array().unwrap();
        assert!(checks.iter().any(|c| c["recommendation"].is_null()));
        assert!(checks.iter().any(|c| c["recommendation"].is_string()));
    }
}
