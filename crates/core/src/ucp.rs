//! UCP (Universal Commerce Protocol) profile.
//!
//! Open commerce standard built from composable capabilities (checkout,
//! identity, order, payment token) with dynamic discovery. Disputes and
//! chargebacks are explicitly out of protocol scope.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::model::{
    ActionDescriptor, ControlCheck, ControlStatus, ErrorPattern, LifecycleState, StepContext,
    StepOutcome, StepResult, ValidationError, ValidationReport,
};
use crate::profile::{coverage, ProtocolProfile};

/// Protocol profile for the Universal Commerce Protocol.
pub struct UcpProfile;

const INTENT_TYPES: &[&str] = &[
    "CatalogRequest",
    "OfferRequest",
    "CheckoutIntent",
    "PaymentTokenExchange",
    "OrderStatus",
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
];

impl ProtocolProfile for UcpProfile {
    fn name(&self) -> &'static str {
        "UCP"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn description(&self) -> &'static str {
        "Universal Commerce Protocol - An open standard for interoperability \
         in commerce, particularly for AI agents. Composable capabilities with \
         dynamic discovery. Explicitly excludes disputes and chargebacks."
    }

    fn intent_types(&self) -> &'static [&'static str] {
        INTENT_TYPES
    }

    fn intent_schema(&self, intent_type: &str) -> Option<Value> {
        match intent_type {
            "CatalogRequest" => Some(json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "filters": {"type": "object"},
                    "pagination": {
                        "type": "object",
                        "properties": {
                            "page": {"type": "integer"},
                            "limit": {"type": "integer"},
                        },
                    },
                },
            })),
            "OfferRequest" => Some(json!({
                "type": "object",
                "required": ["product_id", "quantity"],
                "properties": {
                    "product_id": {"type": "string"},
                    "quantity": {"type": "integer"},
                    "context": {"type": "object"},
                },
            })),
            "CheckoutIntent" => Some(json!({
                "type": "object",
                "required": ["offer_id", "payment_method"],
                "properties": {
                    "offer_id": {"type": "string"},
                    "payment_method": {"type": "string"},
                    "shipping_address": {"type": "object"},
                    "billing_address": {"type": "object"},
                },
            })),
            "PaymentTokenExchange" => Some(json!({
                "type": "object",
                "required": ["token_type", "token_value"],
                "properties": {
                    "token_type": {"type": "string"},
                    "token_value": {"type": "string"},
                    "provider": {"type": "string"},
                },
            })),
            "OrderStatus" => Some(json!({
                "type": "object",
                "required": ["order_id"],
                "properties": {
                    "order_id": {"type": "string"},
                    "status": {
                        "type": "string",
                        "enum": ["pending", "processing", "shipped", "delivered", "cancelled"],
                    },
                    "tracking": {"type": "object"},
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
            ("merchant", &["offer_response", "order_confirmation"]),
            ("psp", &["payment_token"]),
        ])
    }

    fn validate_intent(&self, intent_type: &str, data: &Value) -> ValidationReport {
        let required: &[&str] = match intent_type {
            "OfferRequest" => &["product_id", "quantity"],
            "CheckoutIntent" => &["offer_id", "payment_method"],
            "PaymentTokenExchange" => &["token_type", "token_value"],
            "OrderStatus" => &["order_id"],
            _ => &[],
        };

        let errors = required
            .iter()
            .filter(|field| data.get(**field).is_none())
            .map(|field| ValidationError::missing(*field))
            .collect();

        ValidationReport::from_errors(errors)
    }

    fn execute_step(
        &self,
        current_state: LifecycleState,
        _intent_type: &str,
        data: &Value,
        context: &StepContext,
    ) -> StepOutcome {
        // Each state has a single advancing condition; no failure branches
        // below the point of no return.
        let transition = match current_state {
            LifecycleState::Draft if context.flag("offer_received") => Some((
                LifecycleState::PendingApproval,
                StepResult::new("receive_offer", true, "Offer received from merchant"),
            )),
            LifecycleState::PendingApproval if context.flag("checkout_initiated") => Some((
                LifecycleState::Approved,
                StepResult::new("initiate_checkout", true, "Checkout initiated"),
            )),
            LifecycleState::Approved if context.flag("payment_started") => Some((
                LifecycleState::Executing,
                StepResult::new("process_payment", true, "Payment processing started"),
            )),
            LifecycleState::Executing if context.flag("payment_completed") => Some((
                LifecycleState::AwaitingSettlement,
                StepResult::new(
                    "payment_complete",
                    true,
                    "Payment completed, awaiting order confirmation",
                ),
            )),
            LifecycleState::AwaitingSettlement if context.flag("order_confirmed") => Some((
                LifecycleState::Settled,
                StepResult::new("order_confirmed", true, "Order confirmed by merchant"),
            )),
            _ => None,
        };

        match transition {
            Some((new_state, result)) => StepOutcome::transition(new_state, data.clone(), result),
            None => StepOutcome::unchanged(current_state, data.clone()),
        }
    }

    fn available_actions(
        &self,
        current_state: LifecycleState,
        _intent_type: &str,
        _context: &StepContext,
    ) -> Vec<ActionDescriptor> {
        match current_state {
            LifecycleState::Draft => vec![
                ActionDescriptor::new(
                    "browse_catalog",
                    "Browse Catalog",
                    "agent",
                    "Search merchant catalog",
                ),
                ActionDescriptor::new(
                    "request_offer",
                    "Request Offer",
                    "agent",
                    "Request pricing offer for products",
                ),
            ],
            LifecycleState::PendingApproval => vec![
                ActionDescriptor::new(
                    "accept_offer",
                    "Accept Offer",
                    "agent",
                    "Accept the merchant's offer and proceed to checkout",
                ),
                ActionDescriptor::new(
                    "reject_offer",
                    "Reject Offer",
                    "agent",
                    "Reject offer and optionally request new one",
                ),
            ],
            _ => Vec::new(),
        }
    }

    fn error_patterns(&self) -> Vec<ErrorPattern> {
        vec![
            ErrorPattern::new("OFFER_EXPIRED", "The offer has expired", &["Request new offer"]),
            ErrorPattern::new(
                "PRODUCT_UNAVAILABLE",
                "Product is no longer available",
                &["Search for alternatives"],
            ),
            ErrorPattern::new(
                "PAYMENT_TOKEN_INVALID",
                "Payment token rejected by processor",
                &["Obtain new token", "Try different payment method"],
            ),
            ErrorPattern::new(
                "SHIPPING_UNAVAILABLE",
                "Shipping not available to address",
                &["Try different address", "Select different fulfillment"],
            ),
        ]
    }

    fn security_controls(&self) -> Vec<ControlCheck> {
        vec![
            ControlCheck::new(
                "ucp-discovery",
                "dynamic_discovery",
                "integrity",
                "Merchant capabilities discovered via OpenAPI",
                ControlStatus::Present,
                &["UCP discovery profile"],
                &["capability_mismatch"],
                "Agent may assume capabilities that don't exist",
            ),
            ControlCheck::new(
                "ucp-token-exchange",
                "payment_token_exchange",
                "authentication",
                "Payment credentials exchanged via tokens",
                ControlStatus::Present,
                &["UCP payment token schemas"],
                &["credential_exposure"],
                "Raw payment credentials exposed to agents",
            ),
            ControlCheck::new(
                "ucp-disputes",
                "dispute_handling",
                "operations",
                "Protocol-level dispute resolution",
                ControlStatus::Absent,
                &["UCP scope statement"],
                &[],
                "Disputes handled outside protocol - bank-grade ops needed",
            ),
            ControlCheck::new(
                "ucp-chargebacks",
                "chargeback_handling",
                "operations",
                "Protocol-level chargeback process",
                ControlStatus::Absent,
                &["UCP scope statement"],
                &[],
                "Chargebacks handled by PSP - UCP explicitly excludes this",
            ),
            ControlCheck::new(
                "ucp-offer-binding",
                "offer_binding",
                "integrity",
                "Merchant bound to offered price",
                ControlStatus::Partial,
                &["UCP offer schemas"],
                &["price_manipulation"],
                "Price could change between offer and checkout",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_request_validation_names_each_missing_field() {
        let report = UcpProfile.validate_intent("OfferRequest", &json!({}));
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["product_id", "quantity"]);

        let report =
            UcpProfile.validate_intent("OfferRequest", &json!({"product_id": "p1", "quantity": 2}));
        assert!(report.valid);
    }

    #[test]
    fn catalog_request_has_no_required_fields() {
        let report = UcpProfile.validate_intent("CatalogRequest", &json!({}));
        assert!(report.valid);
    }

    #[test]
    fn happy_path_walks_to_settled() {
        let flags = [
            ("offer_received", LifecycleState::PendingApproval),
            ("checkout_initiated", LifecycleState::Approved),
            ("payment_started", LifecycleState::Executing),
            ("payment_completed", LifecycleState::AwaitingSettlement),
            ("order_confirmed", LifecycleState::Settled),
        ];

        let mut state = LifecycleState::Draft;
        let data = json!({"offer_id": "of_1", "payment_method": "token"});
        for (flag, expected) in flags {
            let mut ctx = StepContext::new();
            ctx.set(flag, json!(true));
            let outcome = UcpProfile.execute_step(state, "CheckoutIntent", &data, &ctx);
            assert_eq!(outcome.new_state, expected);
            assert!(outcome.result.success);
            state = outcome.new_state;
        }
    }

    #[test]
    fn wrong_flag_for_state_is_a_noop() {
        let mut ctx = StepContext::new();
        ctx.set("order_confirmed", json!(true));
        let outcome = UcpProfile.execute_step(LifecycleState::Draft, "CheckoutIntent", &json!({}), &ctx);
        assert_eq!(outcome.new_state, LifecycleState::Draft);
        assert_eq!(outcome.result.action, "no_transition");
    }
}
