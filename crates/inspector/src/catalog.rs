//! Declarative test tables, one per protocol.
//!
//! A `TestDefinition` is immutable configuration: which endpoint to hit,
//! what to expect back, how much the test weighs, and which prior test it
//! depends on. The catalog is built once at process start and shared by
//! reference with every run.

use serde_json::{json, Value};

use crate::target::Method;

/// Protocol-specific response assertions beyond status and field presence.
///
/// A check attached to a test with an endpoint runs against that test's
/// own response; a check on an endpoint-less test runs against the stored
/// response of its `depends_on` predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// Every line item carries its totals breakdown.
    LineItemSchema,
    /// The session status is one of the declared `valid_statuses`.
    StatusIn,
    /// Every supported payment kind names a CAIP-2 network.
    Caip2Networks,
    /// The body is an x402 v2 PaymentRequired challenge.
    X402V2Format,
}

/// One entry in a protocol's test table.
#[derive(Debug, Clone)]
pub struct TestDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub endpoint: Option<&'static str>,
    /// Interpolated against the run context (`{checkout_id}`).
    pub endpoint_template: Option<&'static str>,
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub expected_status: u16,
    pub required_fields: Vec<&'static str>,
    pub expected_header: Option<&'static str>,
    pub weight: u32,
    pub depends_on: Option<&'static str>,
    /// Issue the identical request this many times (default 1).
    pub repeat: u32,
    /// With `repeat > 1`, require byte-equal JSON bodies across calls.
    pub expect_same_response: bool,
    pub json_path: Option<&'static str>,
    pub min_length: Option<usize>,
    pub contains_ap2: bool,
    pub check: Option<CheckKind>,
    pub valid_statuses: Vec<&'static str>,
}

impl TestDefinition {
    fn new(id: &'static str, name: &'static str) -> Self {
        TestDefinition {
            id,
            name,
            endpoint: None,
            endpoint_template: None,
            method: Method::Get,
            body: None,
            headers: Vec::new(),
            expected_status: 200,
            required_fields: Vec::new(),
            expected_header: None,
            weight: 10,
            depends_on: None,
            repeat: 1,
            expect_same_response: false,
            json_path: None,
            min_length: None,
            contains_ap2: false,
            check: None,
            valid_statuses: Vec::new(),
        }
    }

    fn endpoint(mut self, endpoint: &'static str) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    fn endpoint_template(mut self, template: &'static str) -> Self {
        self.endpoint_template = Some(template);
        self
    }

    fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    fn required_fields(mut self, fields: &[&'static str]) -> Self {
        self.required_fields = fields.to_vec();
        self
    }

    fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    fn depends_on(mut self, id: &'static str) -> Self {
        self.depends_on = Some(id);
        self
    }

    fn repeat(mut self, count: u32) -> Self {
        self.repeat = count;
        self
    }

    fn expect_same_response(mut self) -> Self {
        self.expect_same_response = true;
        self
    }

    fn json_path(mut self, path: &'static str) -> Self {
        self.json_path = Some(path);
        self
    }

    fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    fn contains_ap2(mut self) -> Self {
        self.contains_ap2 = true;
        self
    }

    fn check(mut self, kind: CheckKind) -> Self {
        self.check = Some(kind);
        self
    }

    fn valid_statuses(mut self, statuses: &[&'static str]) -> Self {
        self.valid_statuses = statuses.to_vec();
        self
    }
}

/// Immutable test tables for all four protocols.
pub struct TestCatalog {
    ucp: Vec<TestDefinition>,
    acp: Vec<TestDefinition>,
    x402: Vec<TestDefinition>,
    ap2: Vec<TestDefinition>,
}

impl TestCatalog {
    pub fn new() -> Self {
        TestCatalog {
            ucp: ucp_tests(),
            acp: acp_tests(),
            x402: x402_tests(),
            ap2: ap2_tests(),
        }
    }

    /// Resolve a protocol code (case-insensitive) to its canonical code
    /// and test table.
    pub fn resolve(&self, protocol: &str) -> Option<(&'static str, &[TestDefinition])> {
        match protocol.to_ascii_lowercase().as_str() {
            "ucp" => Some(("UCP", &self.ucp)),
            "acp" => Some(("ACP", &self.acp)),
            "x402" => Some(("x402", &self.x402)),
            "ap2" => Some(("AP2", &self.ap2)),
            _ => None,
        }
    }

    /// Protocol codes with display names and test counts.
    pub fn protocols(&self) -> Vec<(&'static str, &'static str, usize)> {
        vec![
            ("UCP", "Universal Commerce Protocol", self.ucp.len()),
            ("ACP", "Agentic Commerce Protocol (OpenAI)", self.acp.len()),
            ("x402", "HTTP 402 Payment Required", self.x402.len()),
            ("AP2", "Agent Payments Protocol (Google)", self.ap2.len()),
        ]
    }
}

impl Default for TestCatalog {
    fn default() -> Self {
        TestCatalog::new()
    }
}

fn ucp_tests() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new("ucp_discovery", "Discovery endpoint returns valid profile")
            .endpoint("/.well-known/ucp")
            .required_fields(&["name", "version", "payment"])
            .weight(20),
        TestDefinition::new("ucp_discovery_payment_handlers", "Discovery includes payment handlers")
            .endpoint("/.well-known/ucp")
            .json_path("payment.handlers")
            .min_length(1)
            .weight(15),
        TestDefinition::new("ucp_checkout_create", "Can create checkout session")
            .endpoint("/checkout-sessions")
            .method(Method::Post)
            .body(json!({
                "currency": "USD",
                "line_items": [{"item": {"id": "test_product"}, "quantity": 1}],
            }))
            .expected_status(201)
            .required_fields(&["id", "status", "line_items"])
            .weight(25),
        TestDefinition::new("ucp_checkout_get", "Can retrieve checkout session")
            .depends_on("ucp_checkout_create")
            .endpoint_template("/checkout-sessions/{checkout_id}")
            .weight(15),
        TestDefinition::new("ucp_idempotency", "Idempotency key is honored")
            .endpoint("/checkout-sessions")
            .method(Method::Post)
            .body(json!({
                "currency": "USD",
                "line_items": [{"item": {"id": "test_product"}, "quantity": 1}],
            }))
            .header("Idempotency-Key", "test-idempotency-key")
            .expected_status(201)
            .repeat(2)
            .expect_same_response()
            .weight(25),
    ]
}

fn acp_tests() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new("acp_discovery", "Discovery endpoint exists")
            .endpoint("/.well-known/checkout")
            .weight(20),
        TestDefinition::new("acp_discovery_api_version", "Discovery includes API-Version")
            .endpoint("/.well-known/checkout")
            .required_fields(&["api_version"])
            .weight(15),
        TestDefinition::new("acp_session_create", "Can create checkout session")
            .endpoint("/checkout_sessions")
            .method(Method::Post)
            .body(json!({"items": [{"id": "item_123", "quantity": 1}]}))
            .header("API-Version", "2026-01-16")
            .expected_status(201)
            .required_fields(&["id", "status", "line_items", "totals"])
            .weight(30),
        TestDefinition::new("acp_session_line_items", "Line items include totals breakdown")
            .depends_on("acp_session_create")
            .check(CheckKind::LineItemSchema)
            .weight(20),
        TestDefinition::new("acp_session_states", "Session status transitions correctly")
            .depends_on("acp_session_create")
            .check(CheckKind::StatusIn)
            .valid_statuses(&["not_ready_for_payment", "ready_for_payment"])
            .weight(15),
    ]
}

fn x402_tests() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new("x402_info", "Info endpoint returns protocol details")
            .endpoint("/info")
            .required_fields(&["x402Version", "protocol", "receiver"])
            .weight(15),
        TestDefinition::new("x402_supported", "Facilitator /supported returns CAIP-2 networks")
            .endpoint("/supported")
            .required_fields(&["kinds", "signers"])
            .check(CheckKind::Caip2Networks)
            .weight(20),
        TestDefinition::new("x402_402_response", "Protected resource returns 402 with PaymentRequired")
            .endpoint("/resource/premium-content")
            .expected_status(402)
            .check(CheckKind::X402V2Format)
            .weight(30),
        // Empty payloads are intentionally invalid; the endpoint existing
        // at all is what earns the weight.
        TestDefinition::new("x402_verify_endpoint", "Facilitator /verify endpoint exists")
            .endpoint("/verify")
            .method(Method::Post)
            .body(json!({"paymentPayload": {}, "paymentRequirements": {}}))
            .expected_status(422)
            .weight(15),
        TestDefinition::new("x402_settle_endpoint", "Facilitator /settle endpoint exists")
            .endpoint("/settle")
            .method(Method::Post)
            .body(json!({"paymentPayload": {}, "paymentRequirements": {}}))
            .expected_status(422)
            .weight(15),
    ]
}

fn ap2_tests() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new("ap2_agent_card", "Agent card with AP2 extension")
            .endpoint("/.well-known/a2a")
            .json_path("capabilities.extensions")
            .contains_ap2()
            .weight(25),
        TestDefinition::new("ap2_message_handler", "A2A message endpoint accepts messages")
            .endpoint("/message")
            .method(Method::Post)
            .body(json!({
                "jsonrpc": "2.0",
                "id": "test-1",
                "method": "ap2/browseProducts",
                "params": {},
            }))
            .weight(35),
    ]
}
