//! ACP (Agentic Commerce Protocol) profile.
//!
//! OpenAI/Stripe's checkout protocol: a CheckoutSession is the central
//! object, its `status` field drives the lifecycle, 3DS authentication is
//! surfaced through `authentication_required`, and cancellations carry an
//! intent trace for analytics.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::model::{
    ActionDescriptor, ControlCheck, ControlStatus, ErrorPattern, LifecycleState, StepContext,
    StepOutcome, StepResult, ValidationError, ValidationReport,
};
use crate::profile::{coverage, ProtocolProfile};

/// Protocol profile for the OpenAI/Stripe Agentic Commerce Protocol.
pub struct AcpProfile;

const INTENT_TYPES: &[&str] = &["CheckoutSession", "CheckoutUpdate", "CheckoutComplete"];

const LIFECYCLE: &[LifecycleState] = &[
    LifecycleState::Draft,
    LifecycleState::PendingApproval,
    LifecycleState::Approved,
    LifecycleState::Executing,
    LifecycleState::AwaitingSettlement,
    LifecycleState::Settled,
    LifecycleState::Cancelled,
    LifecycleState::Failed,
];

impl ProtocolProfile for AcpProfile {
    fn name(&self) -> &'static str {
        "ACP"
    }

    fn version(&self) -> &'static str {
        "draft"
    }

    fn description(&self) -> &'static str {
        "Agentic Commerce Protocol - An open standard for connecting buyers, \
         their AI agents, and businesses. Maintained by OpenAI and Stripe."
    }

    fn intent_types(&self) -> &'static [&'static str] {
        INTENT_TYPES
    }

    fn intent_schema(&self, intent_type: &str) -> Option<Value> {
        match intent_type {
            "CheckoutSession" => Some(json!({
                "type": "object",
                "required": ["id", "status", "items"],
                "properties": {
                    "id": {"type": "string"},
                    "status": {
                        "type": "string",
                        "enum": [
                            "not_ready_for_payment",
                            "ready_for_payment",
                            "authentication_required",
                            "completed",
                            "cancelled",
                        ],
                    },
                    "items": {"type": "array"},
                    "buyer": {"type": "object"},
                    "fulfillment_details": {"type": "object"},
                    "payment_data": {"type": "object"},
                    "affiliate_attribution": {"type": "object"},
                    "authentication_metadata": {
                        "type": "object",
                        "description": "3DS authentication details when status is authentication_required",
                    },
                },
            })),
            "CheckoutUpdate" => Some(json!({
                "type": "object",
                "properties": {
                    "items": {"type": "array"},
                    "fulfillment_details": {"type": "object"},
                    "payment_data": {"type": "object"},
                },
            })),
            "CheckoutComplete" => Some(json!({
                "type": "object",
                "required": ["session_id"],
                "properties": {
                    "session_id": {"type": "string"},
                    "payment_confirmation": {"type": "object"},
                },
            })),
            _ => None,
        }
    }

    fn lifecycle_states(&self) -> &'static [LifecycleState] {
        LIFECYCLE
    }

    fn point_of_no_return(&self) -> LifecycleState {
        LifecycleState::Executing
    }

    fn signature_coverage(&self) -> BTreeMap<String, Vec<String>> {
        coverage(&[
            ("agent", &["checkout_request"]),
            ("merchant", &["session_response", "fulfillment_confirmation"]),
            ("psp", &["payment_confirmation", "authentication_result"]),
        ])
    }

    fn validate_intent(&self, intent_type: &str, data: &Value) -> ValidationReport {
        let mut errors: Vec<ValidationError> = Vec::new();

        match intent_type {
            "CheckoutSession" => {
                if data.get("id").is_none() {
                    errors.push(ValidationError::missing("id"));
                }
                if data.get("status").is_none() {
                    errors.push(ValidationError::missing("status"));
                }
                match data.get("items") {
                    None => errors.push(ValidationError::missing("items")),
                    Some(items) if !items.is_array() => {
                        errors.push(ValidationError::not_an_array("items"));
                    }
                    Some(_) => {}
                }
            }
            "CheckoutComplete" => {
                if data.get("session_id").is_none() {
                    errors.push(ValidationError::missing("session_id"));
                }
            }
            _ => {}
        }

        ValidationReport::from_errors(errors)
    }

    fn execute_step(
        &self,
        current_state: LifecycleState,
        _intent_type: &str,
        data: &Value,
        context: &StepContext,
    ) -> StepOutcome {
        match current_state {
            LifecycleState::Draft => {
                if context.flag("items_added") && context.flag("payment_data_set") {
                    let mut updated = data.clone();
                    set_status(&mut updated, "ready_for_payment");
                    return StepOutcome::transition(
                        LifecycleState::PendingApproval,
                        updated,
                        StepResult::new("prepare_checkout", true, "Checkout ready for payment"),
                    );
                }
            }
            LifecycleState::PendingApproval => {
                // 3DS keeps the session in place; only the status field moves.
                if context.flag("requires_authentication") {
                    let mut updated = data.clone();
                    set_status(&mut updated, "authentication_required");
                    return StepOutcome::transition(
                        current_state,
                        updated,
                        StepResult::new("request_3ds", true, "3DS authentication required"),
                    );
                }
                if context.flag("payment_authorized") {
                    return StepOutcome::transition(
                        LifecycleState::Approved,
                        data.clone(),
                        StepResult::new("authorize_payment", true, "Payment authorized"),
                    );
                }
            }
            LifecycleState::Approved => {
                if context.flag("complete_checkout") {
                    return StepOutcome::transition(
                        LifecycleState::Executing,
                        data.clone(),
                        StepResult::new(
                            "complete_checkout",
                            true,
                            "Processing checkout completion",
                        ),
                    );
                }
            }
            LifecycleState::Executing => {
                if context.flag("payment_captured") {
                    return StepOutcome::transition(
                        LifecycleState::AwaitingSettlement,
                        data.clone(),
                        StepResult::new(
                            "capture_payment",
                            true,
                            "Payment captured, awaiting settlement",
                        ),
                    );
                }
            }
            LifecycleState::AwaitingSettlement => {
                if context.flag("order_confirmed") {
                    let mut updated = data.clone();
                    set_status(&mut updated, "completed");
                    return StepOutcome::transition(
                        LifecycleState::Settled,
                        updated,
                        StepResult::new("confirm_order", true, "Order confirmed and settled"),
                    );
                }
            }
            _ => {}
        }

        StepOutcome::unchanged(current_state, data.clone())
    }

    fn available_actions(
        &self,
        current_state: LifecycleState,
        _intent_type: &str,
        _context: &StepContext,
    ) -> Vec<ActionDescriptor> {
        match current_state {
            LifecycleState::Draft => vec![
                ActionDescriptor::new("add_items", "Add Items", "agent", "Add line items to checkout"),
                ActionDescriptor::new(
                    "set_fulfillment",
                    "Set Fulfillment",
                    "agent",
                    "Configure shipping/delivery details",
                ),
                ActionDescriptor::new(
                    "set_payment",
                    "Set Payment Data",
                    "agent",
                    "Configure payment method",
                ),
            ],
            LifecycleState::PendingApproval => vec![
                ActionDescriptor::new(
                    "complete",
                    "Complete Checkout",
                    "agent",
                    "Finalize and submit checkout",
                ),
                ActionDescriptor::new(
                    "cancel",
                    "Cancel",
                    "agent",
                    "Cancel checkout with intent_trace",
                ),
            ],
            _ => Vec::new(),
        }
    }

    fn error_patterns(&self) -> Vec<ErrorPattern> {
        vec![
            ErrorPattern::new(
                "INVALID_ITEMS",
                "Line items validation failed",
                &["Check item availability", "Verify prices"],
            ),
            ErrorPattern::new(
                "PAYMENT_FAILED",
                "Payment processing failed",
                &["Try different payment method", "Contact issuer"],
            ),
            ErrorPattern::new(
                "AUTHENTICATION_FAILED",
                "3DS authentication failed",
                &["Retry authentication", "Use different card"],
            ),
            ErrorPattern::new(
                "FULFILLMENT_UNAVAILABLE",
                "Shipping/delivery not available",
                &["Select different fulfillment option"],
            ),
            ErrorPattern::new(
                "SESSION_EXPIRED",
                "Checkout session has expired",
                &["Create new session"],
            ),
        ]
    }

    fn security_controls(&self) -> Vec<ControlCheck> {
        vec![
            ControlCheck::new(
                "acp-session-auth",
                "session_authentication",
                "authentication",
                "Checkout session tied to authenticated agent",
                ControlStatus::Present,
                &["ACP agentic checkout OpenAPI spec"],
                &["session_hijacking"],
                "Session can be manipulated by unauthorized parties",
            ),
            ControlCheck::new(
                "acp-3ds",
                "3ds_authentication",
                "authentication",
                "SCA via 3DS for card payments",
                ControlStatus::Present,
                &["ACP agentic checkout examples"],
                &["card_fraud", "unauthorized_payment"],
                "Higher fraud risk on card transactions",
            ),
            ControlCheck::new(
                "acp-intent-trace",
                "intent_trace",
                "audit",
                "Cancellation includes reason_code and trace_summary",
                ControlStatus::Present,
                &["ACP agentic checkout examples"],
                &["analytics_gap"],
                "No visibility into why checkouts are abandoned",
            ),
            ControlCheck::new(
                "acp-idempotency",
                "idempotency",
                "integrity",
                "Idempotency-Key header for safe retries",
                ControlStatus::Present,
                &["ACP agentic checkout OpenAPI spec"],
                &["duplicate_submission"],
                "Retry could create duplicate orders",
            ),
            ControlCheck::new(
                "acp-error-jsonpath",
                "structured_errors",
                "integrity",
                "Error responses include JSONPath to problematic fields",
                ControlStatus::Present,
                &["ACP agentic checkout OpenAPI spec"],
                &["debugging_gap"],
                "Difficult to identify validation failures",
            ),
        ]
    }
}

fn set_status(data: &mut Value, status: &str) {
    if let Some(map) = data.as_object_mut() {
        map.insert("status".to_string(), Value::String(status.to_string()));
    }
}
