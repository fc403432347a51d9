//! The `ProtocolProfile` trait.
//!
//! Each payment protocol implements this interface to provide its intent
//! schemas, its subset of the lifecycle state machine, a pure transition
//! function, and its declared security controls. The variant set is closed
//! and known at build time; implementations are resolved through the
//! read-only [`crate::ProfileRegistry`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::{
    ActionDescriptor, ControlCheck, ErrorPattern, LifecycleState, ProfileMetadata, StepContext,
    StepOutcome, ValidationReport,
};

/// Behavior contract every protocol variant implements.
pub trait ProtocolProfile: Send + Sync {
    /// Protocol code (e.g., `AP2`, `x402`).
    fn name(&self) -> &'static str;

    /// Protocol version being modeled.
    fn version(&self) -> &'static str;

    /// Human-readable description of the protocol.
    fn description(&self) -> &'static str;

    /// Intent types supported by this protocol, in declaration order.
    fn intent_types(&self) -> &'static [&'static str];

    /// JSON Schema for a named intent type. Unknown type returns `None`;
    /// "not found" is a signal to the caller, not an error.
    fn intent_schema(&self, intent_type: &str) -> Option<Value>;

    /// Lifecycle states reachable in this protocol's flow, in typical
    /// progression order.
    fn lifecycle_states(&self) -> &'static [LifecycleState];

    /// The state after which execution is treated as irreversible.
    /// Consumed by risk tooling; not enforced by `execute_step`.
    fn point_of_no_return(&self) -> LifecycleState;

    /// What is signed by whom: signer role mapped to signed artifacts.
    fn signature_coverage(&self) -> BTreeMap<String, Vec<String>>;

    /// Structural validation only: required-field presence and array-type
    /// checks. Never validates semantic or business correctness.
    fn validate_intent(&self, intent_type: &str, data: &Value) -> ValidationReport;

    /// Execute one lifecycle step. Pure: a deterministic transition table
    /// keyed on `(current_state, intent_type, context conditions)`. When no
    /// condition matches, the state and data pass through unchanged with a
    /// successful `no_transition` result. Transitions never regress except
    /// through the explicit failure paths defined by the table.
    fn execute_step(
        &self,
        current_state: LifecycleState,
        intent_type: &str,
        data: &Value,
        context: &StepContext,
    ) -> StepOutcome;

    /// Advisory list of actor/action pairs reachable from `current_state`.
    fn available_actions(
        &self,
        current_state: LifecycleState,
        intent_type: &str,
        context: &StepContext,
    ) -> Vec<ActionDescriptor>;

    /// Recognized error/rejection patterns with recovery guidance.
    fn error_patterns(&self) -> Vec<ErrorPattern>;

    /// Declared security controls with their assessment.
    fn security_controls(&self) -> Vec<ControlCheck>;

    /// Display metadata for the presentation layer.
    fn metadata(&self) -> ProfileMetadata {
        ProfileMetadata {
            name: self.name().to_string(),
            version: self.version().to_string(),
            description: self.description().to_string(),
            intent_types: self.intent_types().iter().map(|s| s.to_string()).collect(),
            lifecycle_states: self
                .lifecycle_states()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            point_of_no_return: self.point_of_no_return().as_str().to_string(),
            signature_coverage: self.signature_coverage(),
        }
    }
}

/// Build a signature coverage map from `(role, artifacts)` pairs.
pub(crate) fn coverage(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    pairs
        .iter()
        .map(|(role, artifacts)| {
            (
                role.to_string(),
                artifacts.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}
