//! Shared value types used by every protocol profile.
//!
//! These types are the wire vocabulary of the auditor: lifecycle states,
//! transition records, validation reports, step outcomes, and the security
//! control inventory. All of them serialize to the JSON shapes consumed by
//! the presentation layer; none of them are mutated after construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

// ──────────────────────────────────────────────
// Lifecycle states
// ──────────────────────────────────────────────

/// Canonical lifecycle states for intents across all protocols.
///
/// Each protocol uses an ordered subset of these states; the shared
/// vocabulary is what makes cross-protocol scoring comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Draft,
    PendingApproval,
    Approved,
    Executing,
    AwaitingSettlement,
    Settled,
    Failed,
    Cancelled,
    Disputed,
}

impl LifecycleState {
    /// Wire string for this state (`draft`, `pending_approval`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Draft => "draft",
            LifecycleState::PendingApproval => "pending_approval",
            LifecycleState::Approved => "approved",
            LifecycleState::Executing => "executing",
            LifecycleState::AwaitingSettlement => "awaiting_settlement",
            LifecycleState::Settled => "settled",
            LifecycleState::Failed => "failed",
            LifecycleState::Cancelled => "cancelled",
            LifecycleState::Disputed => "disputed",
        }
    }

    /// Parse a wire string back into a state.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(LifecycleState::Draft),
            "pending_approval" => Some(LifecycleState::PendingApproval),
            "approved" => Some(LifecycleState::Approved),
            "executing" => Some(LifecycleState::Executing),
            "awaiting_settlement" => Some(LifecycleState::AwaitingSettlement),
            "settled" => Some(LifecycleState::Settled),
            "failed" => Some(LifecycleState::Failed),
            "cancelled" => Some(LifecycleState::Cancelled),
            "disputed" => Some(LifecycleState::Disputed),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a state transition in the intent lifecycle.
///
/// Produced, never mutated. The append-only history these records form is
/// owned by whatever envelope structure sits outside the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: LifecycleState,
    pub to_state: LifecycleState,
    pub actor: String,
    pub reason: Option<String>,
    /// RFC 3339 timestamp string.
    pub timestamp: String,
}

impl StateTransition {
    pub fn new(
        from_state: LifecycleState,
        to_state: LifecycleState,
        actor: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        StateTransition {
            from_state,
            to_state,
            actor: actor.into(),
            reason,
            timestamp: now_rfc3339(),
        }
    }
}

/// Current UTC time formatted as RFC 3339.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

/// A single structural validation failure, anchored to a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// `Missing required field: <path>`
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Missing required field: {}", field);
        ValidationError { field, message }
    }

    /// `Field '<name>' must be an array`
    pub fn not_an_array(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Field '{}' must be an array", field);
        ValidationError { field, message }
    }

    pub fn custom(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of structural intent validation.
///
/// Invariant: `valid == errors.is_empty()`, enforced by construction.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        ValidationReport {
            valid: true,
            errors: Vec::new(),
        }
    }
}

// ──────────────────────────────────────────────
// Step execution
// ──────────────────────────────────────────────

/// Execution context consulted by the transition tables.
///
/// A thin wrapper over a JSON object: condition flags (`user_approved`,
/// `settlement_confirmed`, ...) are read with permissive truthiness so
/// that callers can pass booleans, strings, or numbers interchangeably.
#[derive(Debug, Clone, Default)]
pub struct StepContext(serde_json::Map<String, serde_json::Value>);

impl StepContext {
    pub fn new() -> Self {
        StepContext(serde_json::Map::new())
    }

    /// Build from an arbitrary JSON value; non-objects yield an empty context.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value.as_object() {
            Some(map) => StepContext(map.clone()),
            None => StepContext::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    /// Truthiness of a condition flag: absent and `null` are false; booleans
    /// are themselves; numbers, strings, and containers are true when
    /// non-zero / non-empty.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(serde_json::Value::Object(o)) => !o.is_empty(),
        }
    }
}

/// What a single lifecycle step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub action: String,
    pub success: bool,
    pub message: String,
}

impl StepResult {
    pub fn new(action: impl Into<String>, success: bool, message: impl Into<String>) -> Self {
        StepResult {
            action: action.into(),
            success,
            message: message.into(),
        }
    }

    /// The explicit "no condition matched" outcome. Success, not an error.
    pub fn no_transition(state: LifecycleState) -> Self {
        StepResult::new(
            "no_transition",
            true,
            format!("No transition from {}", state),
        )
    }
}

/// Result of one pure call to `execute_step`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub new_state: LifecycleState,
    pub data: serde_json::Value,
    pub result: StepResult,
}

impl StepOutcome {
    pub fn transition(
        new_state: LifecycleState,
        data: serde_json::Value,
        result: StepResult,
    ) -> Self {
        StepOutcome {
            new_state,
            data,
            result,
        }
    }

    /// Stay in `state`, pass `data` through unchanged.
    pub fn unchanged(state: LifecycleState, data: serde_json::Value) -> Self {
        StepOutcome {
            new_state: state,
            data,
            result: StepResult::no_transition(state),
        }
    }
}

// ──────────────────────────────────────────────
// Advisory actions and error patterns
// ──────────────────────────────────────────────

/// An action reachable from the current state. Purely descriptive; must
/// stay consistent with what `execute_step` would accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub id: String,
    pub name: String,
    pub actor: String,
    pub description: String,
}

impl ActionDescriptor {
    pub fn new(id: &str, name: &str, actor: &str, description: &str) -> Self {
        ActionDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            actor: actor.to_string(),
            description: description.to_string(),
        }
    }
}

/// A recognized error/rejection pattern with recovery guidance.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPattern {
    pub code: String,
    pub description: String,
    pub recovery: Vec<String>,
}

impl ErrorPattern {
    pub fn new(code: &str, description: &str, recovery: &[&str]) -> Self {
        ErrorPattern {
            code: code.to_string(),
            description: description.to_string(),
            recovery: recovery.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ──────────────────────────────────────────────
// Security control inventory
// ──────────────────────────────────────────────

/// Assessment status of a declared security control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    Present,
    Partial,
    Absent,
}

/// A declared security control with its assessment.
#[derive(Debug, Clone, Serialize)]
pub struct ControlCheck {
    pub id: String,
    pub control_name: String,
    pub control_category: String,
    pub description: String,
    pub status: ControlStatus,
    pub evidence: Vec<String>,
    pub attacks_prevented: Vec<String>,
    pub risk_if_absent: String,
}

impl ControlCheck {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        control_name: &str,
        control_category: &str,
        description: &str,
        status: ControlStatus,
        evidence: &[&str],
        attacks_prevented: &[&str],
        risk_if_absent: &str,
    ) -> Self {
        ControlCheck {
            id: id.to_string(),
            control_name: control_name.to_string(),
            control_category: control_category.to_string(),
            description: description.to_string(),
            status,
            evidence: evidence.iter().map(|s| s.to_string()).collect(),
            attacks_prevented: attacks_prevented.iter().map(|s| s.to_string()).collect(),
            risk_if_absent: risk_if_absent.to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// Profile metadata
// ──────────────────────────────────────────────

/// Display metadata for a protocol profile, consumed by the presentation
/// layer. Lifecycle states and point of no return use wire strings.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub intent_types: Vec<String>,
    pub lifecycle_states: Vec<String>,
    pub point_of_no_return: String,
    pub signature_coverage: BTreeMap<String, Vec<String>>,
}
