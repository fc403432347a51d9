//! Sequential, fault-isolated test execution.
//!
//! One run resolves its protocol's table, walks it in declared order, and
//! converts every per-test failure (network, status, body shape) into a
//! failed `TestResult`. Only protocol resolution can fail the run itself,
//! and that happens before any network call.
//!
//! Weighting is keyed strictly by test id, never by position, so a
//! dependency skip cannot misalign weight and result.

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::catalog::{CheckKind, TestCatalog, TestDefinition};
use crate::error::InspectError;
use crate::report::{TestReport, TestResult};
use crate::target::HttpTarget;

/// Mutable state scoped to one run: values captured for endpoint
/// templates and parsed response bodies for dependency-backed checks.
#[derive(Debug, Default)]
struct RunContext {
    values: BTreeMap<String, String>,
    responses: BTreeMap<String, Value>,
}

/// Drives compliance test suites against live targets.
pub struct ComplianceRunner {
    catalog: TestCatalog,
}

impl ComplianceRunner {
    pub fn new() -> Self {
        ComplianceRunner {
            catalog: TestCatalog::new(),
        }
    }

    pub fn catalog(&self) -> &TestCatalog {
        &self.catalog
    }

    /// Run a protocol's suite against `target`. `filter` limits the run to
    /// the named test ids, preserving declared order; `None` runs the full
    /// suite. Always returns one result per selected test.
    pub async fn run(
        &self,
        target: &dyn HttpTarget,
        protocol: &str,
        filter: Option<&[String]>,
    ) -> Result<TestReport, InspectError> {
        let (canonical, table) =
            self.catalog
                .resolve(protocol)
                .ok_or_else(|| InspectError::UnknownProtocol {
                    protocol: protocol.to_string(),
                })?;

        let selected: Vec<&TestDefinition> = match filter {
            None => table.iter().collect(),
            Some(ids) => table
                .iter()
                .filter(|t| ids.iter().any(|id| id.as_str() == t.id))
                .collect(),
        };

        let run_id = format!("run_{:012x}", rand::random::<u64>() & 0xffff_ffff_ffff);
        let started = OffsetDateTime::now_utc();
        let timer = Instant::now();
        let mut context = RunContext::default();
        let mut results: Vec<TestResult> = Vec::with_capacity(selected.len());

        for def in &selected {
            // Cascading skip: a failed dependency means no network call.
            if let Some(dep) = def.depends_on {
                let dep_failed = results.iter().any(|r| r.test_id == dep && !r.passed);
                if dep_failed {
                    results.push(TestResult::skipped(def.id, def.name, dep));
                    continue;
                }
            }

            results.push(run_test(target, def, &mut context).await);
        }

        let duration_ms = timer.elapsed().as_millis() as u64;
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = results.len() - passed;

        // Weight earned/total strictly by test id.
        let weight_by_id: BTreeMap<&str, u32> =
            selected.iter().map(|t| (t.id, t.weight)).collect();
        let total_weight: u32 = weight_by_id.values().sum();
        let earned_weight: u32 = results
            .iter()
            .filter(|r| r.passed)
            .filter_map(|r| weight_by_id.get(r.test_id.as_str()))
            .sum();
        let security_score = if total_weight > 0 {
            earned_weight * 100 / total_weight
        } else {
            0
        };

        let summary = if failed == 0 {
            format!(
                "All {} tests passed! Server is fully compliant with {}.",
                passed, canonical
            )
        } else {
            format!(
                "{} of {} tests failed. Review the results for recommendations.",
                failed,
                passed + failed
            )
        };

        Ok(TestReport {
            run_id,
            target_url: target.base_url().to_string(),
            protocol: canonical.to_string(),
            timestamp: started.format(&Rfc3339).unwrap_or_default(),
            duration_ms,
            passed,
            failed,
            warnings: 0,
            security_score,
            results,
            summary,
        })
    }
}

impl Default for ComplianceRunner {
    fn default() -> Self {
        ComplianceRunner::new()
    }
}

async fn run_test(
    target: &dyn HttpTarget,
    def: &TestDefinition,
    context: &mut RunContext,
) -> TestResult {
    let timer = Instant::now();

    // Resolve the request path: literal endpoint, interpolated template,
    // or none (a dependency-backed assertion with no request of its own).
    let path = if let Some(endpoint) = def.endpoint {
        Some(endpoint.to_string())
    } else if let Some(template) = def.endpoint_template {
        match interpolate(template, &context.values) {
            Ok(path) => Some(path),
            Err(message) => return TestResult::fail(def.id, def.name, elapsed_ms(&timer), message),
        }
    } else {
        None
    };

    let Some(path) = path else {
        return run_stored_check(def, context, &timer);
    };

    // Issue the request; `repeat` re-sends the identical request for
    // idempotency probing.
    let mut responses = Vec::with_capacity(def.repeat.max(1) as usize);
    for _ in 0..def.repeat.max(1) {
        match target
            .request(def.method, &path, &def.headers, def.body.as_ref())
            .await
        {
            Ok(response) => responses.push(response),
            Err(e) => {
                return TestResult::fail(
                    def.id,
                    def.name,
                    elapsed_ms(&timer),
                    format!("Request failed: {}", e),
                )
                .with_recommendation("Check that the target server is running and accessible");
            }
        }
    }
    let duration_ms = elapsed_ms(&timer);
    let response = &responses[0];

    if response.status != def.expected_status {
        return TestResult::fail(
            def.id,
            def.name,
            duration_ms,
            format!(
                "Expected status {}, got {}",
                def.expected_status, response.status
            ),
        )
        .with_expectation(json!(def.expected_status), json!(response.status))
        .with_recommendation(format!(
            "Check that {} returns HTTP {}",
            path, def.expected_status
        ));
    }

    // Idempotency: repeated calls must replay the original response.
    if def.expect_same_response && responses.len() > 1 {
        let first = serde_json::from_str::<Value>(&response.body).ok();
        for later in &responses[1..] {
            let other = serde_json::from_str::<Value>(&later.body).ok();
            let same = match (&first, &other) {
                (Some(a), Some(b)) => a == b,
                _ => response.body == later.body,
            };
            if !same {
                return TestResult::fail(
                    def.id,
                    def.name,
                    duration_ms,
                    "Repeated request with the same idempotency key returned a different response",
                )
                .with_recommendation(
                    "Replay the original response when the Idempotency-Key is reused",
                );
            }
        }
    }

    let body_json = match serde_json::from_str::<Value>(&response.body) {
        Ok(data) => Some(data),
        Err(e) => {
            if !def.required_fields.is_empty() {
                return TestResult::fail(
                    def.id,
                    def.name,
                    duration_ms,
                    format!("Invalid JSON response: {}", e),
                );
            }
            None
        }
    };

    // A parse failure with required fields declared already returned, so
    // `body_json` is always present in this block.
    if let Some(data) = body_json.as_ref().filter(|_| !def.required_fields.is_empty()) {
        for field in &def.required_fields {
            if data.get(field).is_none() {
                return TestResult::fail(
                    def.id,
                    def.name,
                    duration_ms,
                    format!("Missing required field: {}", field),
                )
                .with_recommendation(format!("Include '{}' in the response", field));
            }
        }
        // Capture the created resource id for templated follow-up tests.
        if let Some(id) = data.get("id") {
            let captured = match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            context.values.insert("checkout_id".to_string(), captured);
        }
    }

    // Store the parsed body for dependency-backed checks downstream.
    if let Some(data) = &body_json {
        context.responses.insert(def.id.to_string(), data.clone());
    }

    if let Some(header) = def.expected_header {
        if !response.has_header(header) {
            return TestResult::fail(
                def.id,
                def.name,
                duration_ms,
                format!("Missing expected header: {}", header),
            )
            .with_recommendation(format!("Include {} header in 402 response", header));
        }
    }

    if let Some(path_expr) = def.json_path {
        let Some(data) = &body_json else {
            return TestResult::fail(def.id, def.name, duration_ms, "Response body is not valid JSON");
        };
        let Some(value) = resolve_path(data, path_expr) else {
            return TestResult::fail(
                def.id,
                def.name,
                duration_ms,
                format!("Missing field at path: {}", path_expr),
            )
            .with_recommendation(format!("Include '{}' in the response", path_expr));
        };
        if let Some(min) = def.min_length {
            match value.as_array() {
                None => {
                    return TestResult::fail(
                        def.id,
                        def.name,
                        duration_ms,
                        format!("Expected an array at {}", path_expr),
                    );
                }
                Some(entries) if entries.len() < min => {
                    return TestResult::fail(
                        def.id,
                        def.name,
                        duration_ms,
                        format!(
                            "Expected at least {} entries at {}, found {}",
                            min,
                            path_expr,
                            entries.len()
                        ),
                    );
                }
                Some(_) => {}
            }
        }
        if def.contains_ap2 && !value.to_string().contains("ap2") {
            return TestResult::fail(
                def.id,
                def.name,
                duration_ms,
                format!("AP2 extension not found at {}", path_expr),
            )
            .with_recommendation("Advertise the AP2 extension in the agent card capabilities");
        }
    }

    if let Some(kind) = def.check {
        let Some(data) = &body_json else {
            return TestResult::fail(def.id, def.name, duration_ms, "Response body is not valid JSON");
        };
        if let Err((error, recommendation)) = apply_check(kind, data, &def.valid_statuses) {
            let mut result = TestResult::fail(def.id, def.name, duration_ms, error);
            if let Some(rec) = recommendation {
                result = result.with_recommendation(rec);
            }
            return result;
        }
    }

    TestResult::pass(def.id, def.name, duration_ms)
}

/// Evaluate an endpoint-less test against the stored response of its
/// dependency. No network call is made.
fn run_stored_check(def: &TestDefinition, context: &RunContext, timer: &Instant) -> TestResult {
    let Some(dep) = def.depends_on else {
        return TestResult::fail(
            def.id,
            def.name,
            elapsed_ms(timer),
            "Test declares no endpoint and no dependency to assert against",
        );
    };
    let Some(data) = context.responses.get(dep) else {
        return TestResult::fail(
            def.id,
            def.name,
            elapsed_ms(timer),
            format!("No captured response from dependency '{}'", dep),
        );
    };
    let Some(kind) = def.check else {
        return TestResult::fail(
            def.id,
            def.name,
            elapsed_ms(timer),
            "Test declares no executable assertion",
        );
    };

    match apply_check(kind, data, &def.valid_statuses) {
        Ok(()) => TestResult::pass(def.id, def.name, elapsed_ms(timer)),
        Err((error, recommendation)) => {
            let mut result = TestResult::fail(def.id, def.name, elapsed_ms(timer), error);
            if let Some(rec) = recommendation {
                result = result.with_recommendation(rec);
            }
            result
        }
    }
}

type CheckFailure = (String, Option<String>);

fn apply_check(kind: CheckKind, data: &Value, valid_statuses: &[&str]) -> Result<(), CheckFailure> {
    match kind {
        CheckKind::LineItemSchema => {
            let items = data
                .get("line_items")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    (
                        "Missing required field: line_items".to_string(),
                        Some("Include 'line_items' in the response".to_string()),
                    )
                })?;
            for (i, item) in items.iter().enumerate() {
                for field in ["id", "item", "base_amount", "total"] {
                    if item.get(field).is_none() {
                        return Err((
                            format!("Line item {} missing field: {}", i, field),
                            Some("Include the totals breakdown on every line item".to_string()),
                        ));
                    }
                }
            }
            Ok(())
        }
        CheckKind::StatusIn => {
            let status = data
                .get("status")
                .and_then(Value::as_str)
                .ok_or_else(|| ("Missing required field: status".to_string(), None))?;
            if valid_statuses.contains(&status) {
                Ok(())
            } else {
                Err((
                    format!("Status '{}' not one of: {}", status, valid_statuses.join(", ")),
                    Some("Keep the session status within the documented lifecycle".to_string()),
                ))
            }
        }
        CheckKind::Caip2Networks => {
            let kinds = data.get("kinds").and_then(Value::as_array).ok_or_else(|| {
                (
                    "Missing required field: kinds".to_string(),
                    Some("Include 'kinds' in the response".to_string()),
                )
            })?;
            for (i, entry) in kinds.iter().enumerate() {
                let network = entry.get("network").and_then(Value::as_str).unwrap_or("");
                if !is_caip2(network) {
                    return Err((
                        format!("kinds[{}]: network '{}' is not a CAIP-2 identifier", i, network),
                        Some(
                            "Use namespace:reference network identifiers (e.g., eip155:8453)"
                                .to_string(),
                        ),
                    ));
                }
            }
            Ok(())
        }
        CheckKind::X402V2Format => {
            if data.get("x402Version").is_none() {
                return Err((
                    "Missing required field: x402Version".to_string(),
                    Some("Return an x402 v2 PaymentRequired body with the 402 status".to_string()),
                ));
            }
            let accepts = data.get("accepts").and_then(Value::as_array).ok_or_else(|| {
                (
                    "Missing required field: accepts".to_string(),
                    Some("Return an x402 v2 PaymentRequired body with the 402 status".to_string()),
                )
            })?;
            if accepts.is_empty() {
                return Err((
                    "402 response must include at least one payment option in 'accepts'"
                        .to_string(),
                    None,
                ));
            }
            for (i, option) in accepts.iter().enumerate() {
                for field in ["scheme", "network"] {
                    if option.get(field).is_none() {
                        return Err((
                            format!("accepts[{}]: Missing required field: {}", i, field),
                            None,
                        ));
                    }
                }
            }
            Ok(())
        }
    }
}

/// CAIP-2: `namespace:reference` with namespace `[-a-z0-9]{3,8}` and
/// reference `[-_a-zA-Z0-9]{1,32}`.
fn is_caip2(network: &str) -> bool {
    let Some((namespace, reference)) = network.split_once(':') else {
        return false;
    };
    let namespace_ok = (3..=8).contains(&namespace.len())
        && namespace
            .bytes()
            .all(|b| b == b'-' || b.is_ascii_lowercase() || b.is_ascii_digit());
    let reference_ok = (1..=32).contains(&reference.len())
        && reference
            .bytes()
            .all(|b| b == b'-' || b == b'_' || b.is_ascii_alphanumeric());
    namespace_ok && reference_ok
}

/// Interpolate `{name}` placeholders from the run context.
fn interpolate(template: &str, values: &BTreeMap<String, String>) -> Result<String, String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(format!("Malformed endpoint template: {}", template));
        };
        let key = &after[..close];
        match values.get(key) {
            Some(value) => result.push_str(value),
            None => {
                return Err(format!(
                    "Unresolved placeholder '{{{}}}' in endpoint template",
                    key
                ));
            }
        }
        rest = &after[close + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

/// Walk a dot-separated path through nested JSON objects.
fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn elapsed_ms(timer: &Instant) -> u64 {
    timer.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{HttpTarget, Method, TargetError, TargetResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted target: responds from a routing table and logs every call.
    struct ScriptedTarget {
        routes: Vec<(Method, &'static str, u16, Value)>,
        calls: Mutex<Vec<(Method, String)>>,
    }

    impl ScriptedTarget {
        fn new(routes: Vec<(Method, &'static str, u16, Value)>) -> Self {
            ScriptedTarget {
                routes,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Method, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTarget for ScriptedTarget {
        fn base_url(&self) -> &str {
            "http://scripted.test"
        }

        async fn request(
            &self,
            method: Method,
            path: &str,
            _headers: &[(String, String)],
            _body: Option<&Value>,
        ) -> Result<TargetResponse, TargetError> {
            self.calls.lock().unwrap().push((method, path.to_string()));
            let route = self
                .routes
                .iter()
                .find(|(m, p, _, _)| *m == method && *p == path);
            match route {
                Some((_, _, status, body)) => Ok(TargetResponse {
                    status: *status,
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                    body: body.to_string(),
                }),
                None => Err(TargetError::new("connection refused")),
            }
        }
    }

    fn ucp_target(handlers: Value) -> ScriptedTarget {
        let discovery = json!({
            "name": "Mock Shop",
            "version": "2026-01-11",
            "payment": {"handlers": handlers},
        });
        let session = json!({
            "id": "cs_123",
            "status": "incomplete",
            "line_items": [],
        });
        ScriptedTarget::new(vec![
            (Method::Get, "/.well-known/ucp", 200, discovery),
            (Method::Post, "/checkout-sessions", 201, session.clone()),
            (Method::Get, "/checkout-sessions/cs_123", 200, session),
        ])
    }

    #[tokio::test]
    async fn fully_compliant_ucp_target_scores_one_hundred() {
        let target = ucp_target(json!([{"id": "stripe", "name": "Stripe"}]));
        let runner = ComplianceRunner::new();
        let report = runner.run(&target, "UCP", None).await.unwrap();

        assert_eq!(report.failed, 0);
        assert_eq!(report.passed, report.results.len());
        assert_eq!(report.security_score, 100);
        assert_eq!(report.protocol, "UCP");
        assert!(report.summary.contains("fully compliant"));
        assert!(report.run_id.starts_with("run_"));
    }

    #[tokio::test]
    async fn empty_handlers_cost_exactly_their_weight() {
        // Discovery (20) passes but the handlers test (15) fails on
        // min_length, so the score lands at (100 - 15) / 100.
        let target = ucp_target(json!([]));
        let runner = ComplianceRunner::new();
        let report = runner.run(&target, "UCP", None).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.security_score, 85);
        let handlers = report
            .results
            .iter()
            .find(|r| r.test_id == "ucp_discovery_payment_handlers")
            .unwrap();
        assert!(!handlers.passed);
        assert!(handlers.error.as_deref().unwrap().contains("at least 1"));
    }

    #[tokio::test]
    async fn unknown_protocol_fails_before_any_request() {
        let target = ucp_target(json!([]));
        let runner = ComplianceRunner::new();
        let err = runner.run(&target, "SEPA", None).await.unwrap_err();
        assert!(matches!(err, InspectError::UnknownProtocol { .. }));
        assert!(target.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_dependency_skips_without_network_call() {
        // No POST route: checkout creation fails, so the templated GET
        // must be skipped with zero duration and no outbound call.
        let discovery = json!({
            "name": "Mock Shop",
            "version": "2026-01-11",
            "payment": {"handlers": [{"id": "h"}]},
        });
        let target = ScriptedTarget::new(vec![(
            Method::Get,
            "/.well-known/ucp",
            200,
            discovery,
        )]);
        let runner = ComplianceRunner::new();
        let report = runner.run(&target, "UCP", None).await.unwrap();

        let get_result = report
            .results
            .iter()
            .find(|r| r.test_id == "ucp_checkout_get")
            .unwrap();
        assert!(!get_result.passed);
        assert_eq!(get_result.duration_ms, 0);
        assert_eq!(
            get_result.error.as_deref(),
            Some("Skipped: dependency 'ucp_checkout_create' failed")
        );
        assert!(!target
            .calls()
            .iter()
            .any(|(_, path)| path.starts_with("/checkout-sessions/")));

        let create_result = report
            .results
            .iter()
            .find(|r| r.test_id == "ucp_checkout_create")
            .unwrap();
        assert!(create_result.error.as_deref().unwrap().starts_with("Request failed:"));
        assert_eq!(
            create_result.recommendation.as_deref(),
            Some("Check that the target server is running and accessible")
        );

        assert_eq!(report.passed + report.failed, report.results.len());
    }

    #[tokio::test]
    async fn status_mismatch_reports_expected_and_actual() {
        let target = ScriptedTarget::new(vec![(
            Method::Get,
            "/.well-known/checkout",
            404,
            json!({}),
        )]);
        let runner = ComplianceRunner::new();
        let report = runner
            .run(&target, "ACP", Some(&["acp_discovery".to_string()]))
            .await
            .unwrap();

        let result = &report.results[0];
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("Expected status 200, got 404"));
        assert_eq!(result.expected, Some(json!(200)));
        assert_eq!(result.actual, Some(json!(404)));
        assert_eq!(report.security_score, 0);
    }

    #[tokio::test]
    async fn dependency_backed_checks_read_the_stored_response() {
        let session = json!({
            "id": "cs_9",
            "status": "ready_for_payment",
            "line_items": [{
                "id": "li_1",
                "item": {"id": "item_123"},
                "base_amount": 500,
                "tax": 50,
                "total": 550,
            }],
            "totals": [],
        });
        let target = ScriptedTarget::new(vec![
            (Method::Get, "/.well-known/checkout", 200, json!({"api_version": "2026-01-16"})),
            (Method::Post, "/checkout_sessions", 201, session),
        ]);
        let runner = ComplianceRunner::new();
        let report = runner.run(&target, "ACP", None).await.unwrap();

        assert_eq!(report.failed, 0, "{:?}", report.results);
        assert_eq!(report.security_score, 100);
        // The two check-only tests issued no requests of their own.
        assert_eq!(target.calls().len(), 3);
    }

    #[tokio::test]
    async fn out_of_lifecycle_status_fails_the_states_check() {
        let session = json!({
            "id": "cs_9",
            "status": "completed",
            "line_items": [{
                "id": "li_1",
                "item": {},
                "base_amount": 1,
                "total": 1,
            }],
            "totals": [],
        });
        let target = ScriptedTarget::new(vec![
            (Method::Get, "/.well-known/checkout", 200, json!({"api_version": "2026-01-16"})),
            (Method::Post, "/checkout_sessions", 201, session),
        ]);
        let runner = ComplianceRunner::new();
        let report = runner.run(&target, "ACP", None).await.unwrap();

        let states = report
            .results
            .iter()
            .find(|r| r.test_id == "acp_session_states")
            .unwrap();
        assert!(!states.passed);
        assert_eq!(
            states.error.as_deref(),
            Some("Status 'completed' not one of: not_ready_for_payment, ready_for_payment")
        );
    }

    #[tokio::test]
    async fn missing_required_field_names_the_field() {
        let target = ScriptedTarget::new(vec![(
            Method::Get,
            "/info",
            200,
            json!({"x402Version": 1, "protocol": "x402"}),
        )]);
        let runner = ComplianceRunner::new();
        let report = runner
            .run(&target, "x402", Some(&["x402_info".to_string()]))
            .await
            .unwrap();

        let result = &report.results[0];
        assert_eq!(result.error.as_deref(), Some("Missing required field: receiver"));
        assert_eq!(
            result.recommendation.as_deref(),
            Some("Include 'receiver' in the response")
        );
    }

    #[tokio::test]
    async fn caip2_check_rejects_bare_network_names() {
        let supported = json!({
            "kinds": [{"scheme": "exact", "network": "base-sepolia"}],
            "signers": {},
        });
        let target = ScriptedTarget::new(vec![(Method::Get, "/supported", 200, supported)]);
        let runner = ComplianceRunner::new();
        let report = runner
            .run(&target, "x402", Some(&["x402_supported".to_string()]))
            .await
            .unwrap();

        let result = &report.results[0];
        assert!(!result.passed);
        assert_eq!(
            result.error.as_deref(),
            Some("kinds[0]: network 'base-sepolia' is not a CAIP-2 identifier")
        );
    }

    #[tokio::test]
    async fn ap2_agent_card_requires_the_extension() {
        let card_without = json!({
            "capabilities": {"extensions": [{"uri": "https://example.com/other"}]},
        });
        let target = ScriptedTarget::new(vec![
            (Method::Get, "/.well-known/a2a", 200, card_without),
            (Method::Post, "/message", 200, json!({"jsonrpc": "2.0", "result": {}})),
        ]);
        let runner = ComplianceRunner::new();
        let report = runner.run(&target, "AP2", None).await.unwrap();

        let card = report
            .results
            .iter()
            .find(|r| r.test_id == "ap2_agent_card")
            .unwrap();
        assert!(!card.passed);
        assert_eq!(
            card.error.as_deref(),
            Some("AP2 extension not found at capabilities.extensions")
        );
        // 35 of 60 earned: truncates to 58.
        assert_eq!(report.security_score, 58);
    }

    #[test]
    fn interpolation_resolves_and_reports_missing_keys() {
        let mut values = BTreeMap::new();
        values.insert("checkout_id".to_string(), "cs_42".to_string());

        assert_eq!(
            interpolate("/checkout-sessions/{checkout_id}", &values).unwrap(),
            "/checkout-sessions/cs_42"
        );
        let err = interpolate("/orders/{order_id}", &values).unwrap_err();
        assert_eq!(err, "Unresolved placeholder '{order_id}' in endpoint template");
    }

    #[test]
    fn path_resolution_walks_nested_objects() {
        let data = json!({"payment": {"handlers": [1, 2]}});
        assert_eq!(resolve_path(&data, "payment.handlers"), Some(&json!([1, 2])));
        assert_eq!(resolve_path(&data, "payment.missing"), None);
        assert_eq!(resolve_path(&data, "payment"), data.get("payment"));
    }

    #[test]
    fn caip2_shapes() {
        assert!(is_caip2("eip155:8453"));
        assert!(is_caip2("solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"));
        assert!(!is_caip2("eip155"));
        assert!(!is_caip2("ip:1"));
        assert!(!is_caip2("EIP155:8453"));
        assert!(!is_caip2("eip155:"));
    }
}
