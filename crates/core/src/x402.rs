//! x402 profile.
//!
//! Coinbase's HTTP 402 micropayment protocol: a PaymentRequired challenge
//! with an `accepts` array, an EIP-712-signed PaymentPayload (EIP-3009
//! transferWithAuthorization), and facilitator-driven verification and
//! settlement. Networks are identified with CAIP-2 strings.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::model::{
    ActionDescriptor, ControlCheck, ControlStatus, ErrorPattern, LifecycleState, StepContext,
    StepOutcome, StepResult, ValidationError, ValidationReport,
};
use crate::profile::{coverage, ProtocolProfile};

/// Protocol profile for Coinbase's x402 micropayments protocol.
pub struct X402Profile;

const INTENT_TYPES: &[&str] = &[
    "PaymentRequired",
    "PaymentPayload",
    "SettlementResponse",
    "VerifyResponse",
];

// No cancelled/disputed: an x402 exchange either settles on-chain or fails.
const LIFECYCLE: &[LifecycleState] = &[
    LifecycleState::Draft,
    LifecycleState::PendingApproval,
    LifecycleState::Approved,
    LifecycleState::Executing,
    LifecycleState::AwaitingSettlement,
    LifecycleState::Settled,
    LifecycleState::Failed,
];

impl ProtocolProfile for X402Profile {
    fn name(&self) -> &'static str {
        "x402"
    }

    fn version(&self) -> &'static str {
        "2.0.0"
    }

    fn description(&self) -> &'static str {
        "x402 - An open standard for internet-native payments using HTTP 402. \
         Supports EVM and Solana chains with cryptographic payment authorization."
    }

    fn intent_types(&self) -> &'static [&'static str] {
        INTENT_TYPES
    }

    fn intent_schema(&self, intent_type: &str) -> Option<Value> {
        match intent_type {
            "PaymentRequired" => Some(json!({
                "type": "object",
                "required": ["accepts", "x402Version"],
                "properties": {
                    "x402Version": {"type": "integer", "const": 1},
                    "accepts": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["scheme", "network", "maxAmountRequired"],
                            "properties": {
                                "scheme": {"type": "string"},
                                "network": {
                                    "type": "string",
                                    "description": "CAIP-2 network identifier",
                                },
                                "maxAmountRequired": {"type": "string"},
                                "resource": {"type": "string"},
                                "description": {"type": "string"},
                                "mimeType": {"type": "string"},
                                "payTo": {"type": "string"},
                                "maxTimeoutSeconds": {"type": "integer"},
                                "extra": {"type": "object"},
                            },
                        },
                    },
                    "error": {"type": "string"},
                },
            })),
            "PaymentPayload" => Some(json!({
                "type": "object",
                "required": ["x402Version", "scheme", "network", "payload"],
                "properties": {
                    "x402Version": {"type": "integer", "const": 1},
                    "scheme": {"type": "string"},
                    "network": {"type": "string"},
                    "payload": {
                        "type": "object",
                        "description": "Scheme-specific payload (e.g., EIP-3009 signature)",
                    },
                },
            })),
            "SettlementResponse" => Some(json!({
                "type": "object",
                "required": ["success"],
                "properties": {
                    "success": {"type": "boolean"},
                    "transaction": {"type": "string"},
                    "network": {"type": "string"},
                    "payer": {"type": "string"},
                    "error": {"type": "string"},
                    "errorCode": {"type": "string"},
                },
            })),
            "VerifyResponse" => Some(json!({
                "type": "object",
                "required": ["isValid"],
                "properties": {
                    "isValid": {"type": "boolean"},
                    "invalidReason": {"type": "string"},
                    "payer": {"type": "string"},
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
            ("payer", &["transferWithAuthorization", "payment_payload"]),
            ("facilitator", &["settlement_response", "verify_response"]),
        ])
    }

    fn validate_intent(&self, intent_type: &str, data: &Value) -> ValidationReport {
        let mut errors: Vec<ValidationError> = Vec::new();

        match intent_type {
            "PaymentRequired" => match data.get("accepts") {
                None => errors.push(ValidationError::missing("accepts")),
                Some(accepts) => match accepts.as_array() {
                    None => errors.push(ValidationError::not_an_array("accepts")),
                    Some(options) if options.is_empty() => errors.push(ValidationError::custom(
                        "accepts",
                        "Field 'accepts' must have at least one payment option",
                    )),
                    Some(options) => {
                        for (i, option) in options.iter().enumerate() {
                            for field in ["scheme", "network"] {
                                if option.get(field).is_none() {
                                    errors.push(ValidationError::custom(
                                        format!("accepts[{}].{}", i, field),
                                        format!("accepts[{}]: Missing required field: {}", i, field),
                                    ));
                                }
                            }
                        }
                    }
                },
            },
            "PaymentPayload" => {
                for field in ["x402Version", "scheme", "network", "payload"] {
                    if data.get(field).is_none() {
                        errors.push(ValidationError::missing(field));
                    }
                }
            }
            "SettlementResponse" => {
                if data.get("success").is_none() {
                    errors.push(ValidationError::missing("success"));
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
                // Client makes the request and receives the 402 challenge.
                if context.flag("request_sent") {
                    return StepOutcome::transition(
                        LifecycleState::PendingApproval,
                        data.clone(),
                        StepResult::new(
                            "receive_402",
                            true,
                            "Received 402 Payment Required with payment options",
                        ),
                    );
                }
            }
            LifecycleState::PendingApproval => {
                if data.get("payload").is_some() && context.flag("signature_ready") {
                    return StepOutcome::transition(
                        LifecycleState::Approved,
                        data.clone(),
                        StepResult::new(
                            "sign_payment",
                            true,
                            "Payment payload signed with EIP-712",
                        ),
                    );
                }
            }
            LifecycleState::Approved => {
                if context.flag("verification_complete") {
                    if context.flag("is_valid") {
                        return StepOutcome::transition(
                            LifecycleState::Executing,
                            data.clone(),
                            StepResult::new(
                                "verify_payment",
                                true,
                                "Facilitator verified payment signature",
                            ),
                        );
                    }
                    let reason = context
                        .get_str("invalid_reason")
                        .unwrap_or("Verification failed");
                    return StepOutcome::transition(
                        LifecycleState::Failed,
                        data.clone(),
                        StepResult::new("verify_payment", false, reason),
                    );
                }
            }
            LifecycleState::Executing => {
                if context.flag("settlement_started") {
                    return StepOutcome::transition(
                        LifecycleState::AwaitingSettlement,
                        data.clone(),
                        StepResult::new(
                            "initiate_settlement",
                            true,
                            "On-chain settlement initiated",
                        ),
                    );
                }
            }
            LifecycleState::AwaitingSettlement => {
                if context.flag("transaction_confirmed") {
                    let tx_hash = context
                        .get("transaction_hash")
                        .cloned()
                        .unwrap_or(Value::Null);
                    let mut updated = data.clone();
                    if let Some(map) = updated.as_object_mut() {
                        map.insert("transaction_hash".to_string(), tx_hash.clone());
                    }
                    let label = tx_hash.as_str().unwrap_or("unknown").to_string();
                    return StepOutcome::transition(
                        LifecycleState::Settled,
                        updated,
                        StepResult::new(
                            "confirm_settlement",
                            true,
                            format!("Transaction confirmed: {}", label),
                        ),
                    );
                }
                if context.flag("transaction_failed") {
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
        _intent_type: &str,
        _context: &StepContext,
    ) -> Vec<ActionDescriptor> {
        match current_state {
            LifecycleState::Draft => vec![ActionDescriptor::new(
                "send_request",
                "Send Request",
                "client",
                "Send HTTP request to protected resource",
            )],
            LifecycleState::PendingApproval => vec![
                ActionDescriptor::new(
                    "sign_payment",
                    "Sign Payment",
                    "payer",
                    "Sign EIP-712 payment authorization",
                ),
                ActionDescriptor::new("cancel", "Cancel", "client", "Abandon payment request"),
            ],
            LifecycleState::Approved => vec![ActionDescriptor::new(
                "submit_payment",
                "Submit Payment",
                "client",
                "Submit signed payment to resource server",
            )],
            LifecycleState::Executing => vec![ActionDescriptor::new(
                "await_verification",
                "Await Verification",
                "facilitator",
                "Facilitator verifies and settles payment",
            )],
            _ => Vec::new(),
        }
    }

    fn error_patterns(&self) -> Vec<ErrorPattern> {
        vec![
            ErrorPattern::new(
                "INVALID_SIGNATURE",
                "EIP-712 signature verification failed",
                &["Re-sign with correct key", "Check nonce"],
            ),
            ErrorPattern::new(
                "INSUFFICIENT_BALANCE",
                "Payer has insufficient token balance",
                &["Fund wallet", "Use different payment method"],
            ),
            ErrorPattern::new(
                "NONCE_ALREADY_USED",
                "Payment nonce has already been used",
                &["Generate new nonce", "Check for duplicate submission"],
            ),
            ErrorPattern::new(
                "AUTHORIZATION_EXPIRED",
                "Payment authorization has expired",
                &["Request new payment", "Increase validBefore"],
            ),
            ErrorPattern::new(
                "UNSUPPORTED_NETWORK",
                "Requested network not supported by facilitator",
                &["Use different network", "Find compatible facilitator"],
            ),
            ErrorPattern::new(
                "SETTLEMENT_FAILED",
                "On-chain transaction reverted",
                &["Check gas", "Retry with higher gas", "Check allowance"],
            ),
        ]
    }

    fn security_controls(&self) -> Vec<ControlCheck> {
        vec![
            ControlCheck::new(
                "x402-eip3009-nonce",
                "eip3009_nonce",
                "integrity",
                "EIP-3009 nonce prevents replay attacks",
                ControlStatus::Present,
                &["x402 specification v2, authorization nonce"],
                &["replay"],
                "Same payment can be submitted multiple times",
            ),
            ControlCheck::new(
                "x402-eip712-signature",
                "eip712_signature",
                "authentication",
                "EIP-712 typed data signature for payment authorization",
                ControlStatus::Present,
                &["x402 specification v2, payment payload"],
                &["forgery", "tampering"],
                "Payments can be forged",
            ),
            ControlCheck::new(
                "x402-time-bounds",
                "time_bounds",
                "authorization",
                "validAfter and validBefore timestamp constraints",
                ControlStatus::Present,
                &["x402 specification v2, authorization window"],
                &["delayed_replay"],
                "Old authorizations remain valid indefinitely",
            ),
            ControlCheck::new(
                "x402-simulation",
                "transaction_simulation",
                "verification",
                "Facilitator simulates transaction before settlement",
                ControlStatus::Present,
                &["x402 specification v2, settlement flow"],
                &["failed_settlement"],
                "Settlement may fail after authorization",
            ),
            ControlCheck::new(
                "x402-facilitator-trust",
                "facilitator_trust",
                "trust",
                "Resource server trusts facilitator for verification",
                ControlStatus::Partial,
                &["x402 specification v2, roles"],
                &["unauthorized_settlement"],
                "Malicious facilitator could falsely claim settlement",
            ),
            ControlCheck::new(
                "x402-network-isolation",
                "network_isolation",
                "integrity",
                "CAIP-2 network identifier prevents cross-chain replay",
                ControlStatus::Present,
                &["x402 specification v2, network identifiers"],
                &["cross_chain_replay"],
                "Payment valid on one chain could be replayed on another",
            ),
        ]
    }
}
