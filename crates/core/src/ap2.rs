//! AP2 (Agent Payments Protocol) profile.
//!
//! Google's mandate-based protocol: a merchant-signed CartMandate, a
//! user-signed PaymentMandate, and Verifiable Digital Credentials for
//! non-repudiation. Human-present and human-not-present flows share the
//! same lifecycle.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::model::{
    ActionDescriptor, ControlCheck, ControlStatus, ErrorPattern, LifecycleState, StepContext,
    StepOutcome, StepResult, ValidationError, ValidationReport,
};
use crate::profile::{coverage, ProtocolProfile};

/// Protocol profile for Google's Agent Payments Protocol (AP2).
pub struct Ap2Profile;

const INTENT_TYPES: &[&str] = &[
    "CartMandate",
    "IntentMandate",
    "PaymentMandate",
    "PaymentReceipt",
];

const LIFECYCLE: &[LifecycleState] = &[
    LifecycleState::Draft,
    LifecycleState::PendingApproval,
    LifecycleState::Approved,
    LifecycleState::Executing,
    LifecycleState::AwaitingSettlement,
    LifecycleState::Settled,
    LifecycleState::Failed,
    LifecycleState::Cancelled,
    LifecycleState::Disputed,
];

impl ProtocolProfile for Ap2Profile {
    fn name(&self) -> &'static str {
        "AP2"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn description(&self) -> &'static str {
        "Agent Payments Protocol - A secure framework for AI agent-mediated \
         transactions using Verifiable Digital Credentials (VDCs) for \
         non-repudiation and accountability."
    }

    fn intent_types(&self) -> &'static [&'static str] {
        INTENT_TYPES
    }

    fn intent_schema(&self, intent_type: &str) -> Option<Value> {
        match intent_type {
            "CartMandate" => Some(json!({
                "type": "object",
                "required": ["contents", "merchant_authorization"],
                "properties": {
                    "contents": {
                        "type": "object",
                        "required": ["id", "merchant_name", "payment_request"],
                        "properties": {
                            "id": {"type": "string"},
                            "merchant_name": {"type": "string"},
                            "payment_request": {"type": "object"},
                        },
                    },
                    "merchant_authorization": {
                        "type": "string",
                        "description": "JWT signed by merchant's private key",
                    },
                },
            })),
            "PaymentMandate" => Some(json!({
                "type": "object",
                "required": ["payment_mandate_contents"],
                "properties": {
                    "payment_mandate_contents": {
                        "type": "object",
                        "required": [
                            "payment_mandate_id",
                            "timestamp",
                            "payment_details_id",
                            "payment_details_total",
                            "payment_response",
                            "merchant_agent",
                        ],
                        "properties": {
                            "payment_mandate_id": {"type": "string"},
                            "timestamp": {"type": "string", "format": "date-time"},
                            "payment_details_id": {"type": "string"},
                            "payment_details_total": {"type": "object"},
                            "payment_response": {"type": "object"},
                            "merchant_agent": {"type": "string"},
                        },
                    },
                    "user_authorization": {
                        "type": "string",
                        "description": "User's cryptographic signature",
                    },
                },
            })),
            "IntentMandate" => Some(json!({
                "type": "object",
                "required": ["contents", "user_authorization"],
                "properties": {
                    "contents": {
                        "type": "object",
                        "required": ["intent_id", "intent_description", "limits"],
                        "properties": {
                            "intent_id": {"type": "string"},
                            "intent_description": {"type": "string"},
                            "limits": {"type": "object"},
                            "allowed_merchants": {
                                "type": "array",
                                "items": {"type": "string"},
                            },
                        },
                    },
                    "user_authorization": {"type": "string"},
                },
            })),
            "PaymentReceipt" => Some(json!({
                "type": "object",
                "required": ["receipt_id", "status", "timestamp"],
                "properties": {
                    "receipt_id": {"type": "string"},
                    "status": {
                        "type": "string",
                        "enum": ["SUCCESS", "FAILED", "PENDING"],
                    },
                    "timestamp": {"type": "string", "format": "date-time"},
                    "transaction_id": {"type": "string"},
                    "amount": {"type": "object"},
                },
            })),
            _ => None,
        }
    }

    fn lifecycle_states(&self) -> &'static [LifecycleState] {
        LIFECYCLE
    }

    fn point_of_no_return(&self) -> LifecycleState {
        LifecycleState::AwaitingSettlement
    }

    fn signature_coverage(&self) -> BTreeMap<String, Vec<String>> {
        coverage(&[
            (
                "user",
                &[
                    "payment_mandate",
                    "cart_mandate_hash",
                    "payment_mandate_hash",
                    "intent_mandate",
                ],
            ),
            ("merchant", &["cart_mandate"]),
            ("payment_processor", &["payment_receipt"]),
            ("credentials_provider", &["payment_credential"]),
        ])
    }

    fn validate_intent(&self, intent_type: &str, data: &Value) -> ValidationReport {
        let mut errors: Vec<ValidationError> = Vec::new();

        match intent_type {
            "CartMandate" => match data.get("contents") {
                None => errors.push(ValidationError::missing("contents")),
                Some(contents) => {
                    for field in ["id", "merchant_name", "payment_request"] {
                        if contents.get(field).is_none() {
                            errors.push(ValidationError::missing(format!("contents.{}", field)));
                        }
                    }
                }
            },
            "PaymentMandate" => {
                if data.get("payment_mandate_contents").is_none() {
                    errors.push(ValidationError::missing("payment_mandate_contents"));
                }
            }
            "IntentMandate" => {
                if data.get("contents").is_none() {
                    errors.push(ValidationError::missing("contents"));
                }
                if data.get("user_authorization").is_none() {
                    errors.push(ValidationError::missing("user_authorization"));
                }
            }
            _ => {}
        }

        ValidationReport::from_errors(errors)
    }

    fn execute_step(
        &self,
        current_state: LifecycleState,
        intent_type: &str,
        data: &Value,
        context: &StepContext,
    ) -> StepOutcome {
        match current_state {
            LifecycleState::Draft => {
                // Merchant creates and signs the cart.
                if intent_type == "CartMandate" && data.get("merchant_authorization").is_some() {
                    return StepOutcome::transition(
                        LifecycleState::PendingApproval,
                        data.clone(),
                        StepResult::new(
                            "merchant_sign_cart",
                            true,
                            "Cart mandate signed by merchant",
                        ),
                    );
                }
            }
            LifecycleState::PendingApproval => {
                if context.flag("user_approved") {
                    return StepOutcome::transition(
                        LifecycleState::Approved,
                        data.clone(),
                        StepResult::new("user_approve", true, "User approved the mandate"),
                    );
                }
            }
            LifecycleState::Approved => {
                if intent_type == "PaymentMandate" && data.get("user_authorization").is_some() {
                    return StepOutcome::transition(
                        LifecycleState::Executing,
                        data.clone(),
                        StepResult::new(
                            "user_sign_payment",
                            true,
                            "Payment mandate signed by user",
                        ),
                    );
                }
            }
            LifecycleState::Executing => {
                if context.flag("payment_initiated") {
                    return StepOutcome::transition(
                        LifecycleState::AwaitingSettlement,
                        data.clone(),
                        StepResult::new(
                            "initiate_payment",
                            true,
                            "Payment initiated with processor",
                        ),
                    );
                }
            }
            LifecycleState::AwaitingSettlement => {
                if context.flag("settlement_confirmed") {
                    return StepOutcome::transition(
                        LifecycleState::Settled,
                        data.clone(),
                        StepResult::new("confirm_settlement", true, "Settlement confirmed"),
                    );
                }
                if context.flag("settlement_failed") {
                    let reason = context
                        .get_str("failure_reason")
                        .unwrap_or("Settlement failed");
                    return StepOutcome::transition(
                        LifecycleState::Failed,
                        data.clone(),
                        StepResult::new("settlement_failed", false, reason),
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
        intent_type: &str,
        _context: &StepContext,
    ) -> Vec<ActionDescriptor> {
        let mut actions = Vec::new();

        match current_state {
            LifecycleState::Draft => {
                if intent_type == "CartMandate" {
                    actions.push(ActionDescriptor::new(
                        "merchant_sign_cart",
                        "Sign Cart Mandate",
                        "merchant",
                        "Merchant signs the cart with their private key",
                    ));
                }
            }
            LifecycleState::PendingApproval => {
                actions.push(ActionDescriptor::new(
                    "user_approve",
                    "Approve",
                    "user",
                    "User reviews and approves the mandate",
                ));
                actions.push(ActionDescriptor::new(
                    "user_reject",
                    "Reject",
                    "user",
                    "User rejects the mandate",
                ));
            }
            LifecycleState::Approved => {
                if intent_type == "CartMandate" || intent_type == "PaymentMandate" {
                    actions.push(ActionDescriptor::new(
                        "user_sign_payment",
                        "Sign Payment Mandate",
                        "user",
                        "User signs the payment authorization",
                    ));
                }
            }
            LifecycleState::Executing => {
                actions.push(ActionDescriptor::new(
                    "await_completion",
                    "Await Completion",
                    "system",
                    "Wait for payment processor response",
                ));
            }
            _ => {}
        }

        actions
    }

    fn error_patterns(&self) -> Vec<ErrorPattern> {
        vec![
            ErrorPattern::new(
                "INVALID_MANDATE",
                "Mandate validation failed",
                &["Correct mandate fields", "Regenerate mandate"],
            ),
            ErrorPattern::new(
                "SIGNATURE_MISMATCH",
                "Cryptographic signature verification failed",
                &["Re-sign with correct key", "Verify key ownership"],
            ),
            ErrorPattern::new(
                "CART_EXPIRED",
                "Cart mandate has expired",
                &["Request fresh cart from merchant"],
            ),
            ErrorPattern::new(
                "PAYMENT_DECLINED",
                "Payment processor declined the transaction",
                &["Try different payment method", "Contact issuer"],
            ),
            ErrorPattern::new(
                "MERCHANT_NOT_TRUSTED",
                "Merchant not in user's allowlist",
                &["Add merchant to allowlist", "Use different merchant"],
            ),
            ErrorPattern::new(
                "LIMIT_EXCEEDED",
                "Transaction exceeds configured limits",
                &["Split transaction", "Request limit increase"],
            ),
        ]
    }

    fn security_controls(&self) -> Vec<ControlCheck> {
        vec![
            ControlCheck::new(
                "ap2-sig-user",
                "user_signature",
                "authentication",
                "User signs payment mandate with private key",
                ControlStatus::Present,
                &["AP2 shopping agent signing flow"],
                &["forgery", "repudiation"],
                "Unauthorized transactions possible",
            ),
            ControlCheck::new(
                "ap2-sig-merchant",
                "merchant_signature",
                "authentication",
                "Merchant signs cart mandate with JWT",
                ControlStatus::Present,
                &["AP2 merchant agent signing flow"],
                &["cart_tampering", "merchant_substitution"],
                "Cart contents can be modified after creation",
            ),
            ControlCheck::new(
                "ap2-hash-binding",
                "hash_binding",
                "integrity",
                "User authorization includes hashes of cart and payment mandates",
                ControlStatus::Partial,
                &["AP2 shopping agent authorization flow"],
                &["replay", "tampering"],
                "Signed authorization can be reused with different payload",
            ),
            ControlCheck::new(
                "ap2-confirmation-ux",
                "confirmation_ux",
                "authorization",
                "Human-present flow requires explicit user confirmation",
                ControlStatus::Present,
                &["AP2 specification, human-present flow"],
                &["confused_deputy", "prompt_injection"],
                "Agent can execute payments without user awareness",
            ),
            ControlCheck::new(
                "ap2-intent-limits",
                "intent_limits",
                "authorization",
                "IntentMandate specifies spending limits and allowed merchants",
                ControlStatus::Present,
                &["AP2 specification, IntentMandate limits"],
                &["budget_exhaustion", "merchant_substitution"],
                "Unbounded spending possible",
            ),
            ControlCheck::new(
                "ap2-idempotency",
                "idempotency",
                "integrity",
                "Payment mandate ID prevents duplicate processing",
                ControlStatus::Partial,
                &["AP2 shopping agent mandate id handling"],
                &["replay", "double_spend"],
                "Same payment can be processed multiple times",
            ),
        ]
    }
}
