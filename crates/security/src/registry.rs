//! The weighted-check registry.
//!
//! Fixed at build time and shared across protocols. Scoring only counts
//! checks whose id appears here; a check carrying an unregistered id
//! contributes neither weight nor failure.

use serde::{Deserialize, Serialize};

/// Severity attached to a security check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Static definition of one weighted security check.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub weight: u32,
    pub severity: Severity,
}

/// The full registry. Weights sum to 100 so a run of all six checks maps
/// directly onto the 0-100 score scale.
pub const SECURITY_CHECKS: [CheckSpec; 6] = [
    CheckSpec {
        id: "signature_present",
        name: "Signature Present",
        description: "Payment includes a cryptographic signature",
        weight: 20,
        severity: Severity::Critical,
    },
    CheckSpec {
        id: "signature_format",
        name: "Valid Signature Format",
        description: "Signature follows expected format (hex, length)",
        weight: 15,
        severity: Severity::High,
    },
    CheckSpec {
        id: "nonce_unique",
        name: "Unique Nonce",
        description: "Nonce has not been used before (replay protection)",
        weight: 25,
        severity: Severity::Critical,
    },
    CheckSpec {
        id: "time_window",
        name: "Valid Time Window",
        description: "Authorization is within valid time bounds",
        weight: 15,
        severity: Severity::High,
    },
    CheckSpec {
        id: "amount_match",
        name: "Amount Matches",
        description: "Payment amount meets or exceeds required amount",
        weight: 10,
        severity: Severity::Medium,
    },
    CheckSpec {
        id: "recipient_match",
        name: "Recipient Matches",
        description: "Payment recipient matches expected address",
        weight: 15,
        severity: Severity::Critical,
    },
];

/// Look up a check definition by id.
pub fn spec_for(id: &str) -> Option<&'static CheckSpec> {
    SECURITY_CHECKS.iter().find(|spec| spec.id == id)
}
