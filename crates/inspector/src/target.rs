//! HTTP target abstraction.
//!
//! The runner talks to the server under test through the [`HttpTarget`]
//! trait so that tests can script responses in memory. The production
//! implementation wraps `ureq` (sync) in `tokio::task::spawn_blocking` to
//! avoid blocking the async runtime; the agent is scoped to one run and
//! released when the target is dropped.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// HTTP methods the test tables may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A response as seen by the runner: status, headers, raw body text.
#[derive(Debug, Clone)]
pub struct TargetResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TargetResponse {
    /// Case-insensitive header presence check.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// A network-level failure: connection refused, DNS, timeout. Caught by
/// the runner and converted into a failed `TestResult`, never raised out
/// of the run.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TargetError {
    pub message: String,
}

impl TargetError {
    pub fn new(message: impl Into<String>) -> Self {
        TargetError {
            message: message.into(),
        }
    }
}

/// Capability the runner needs from a server under test.
#[async_trait]
pub trait HttpTarget: Send + Sync {
    /// Base URL of the target, recorded in the report.
    fn base_url(&self) -> &str;

    /// Issue one request against the target. `path` is absolute
    /// (`/checkout-sessions`); `body` is sent as JSON when present.
    async fn request(
        &self,
        method: Method,
        path: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<TargetResponse, TargetError>;
}

/// Per-call timeout applied to every request a run issues.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Production target backed by a run-scoped `ureq::Agent`.
///
/// Non-2xx statuses are responses, not errors -- the tables expect 402 and
/// 422 outcomes as first-class results.
pub struct UreqTarget {
    base_url: String,
    agent: ureq::Agent,
}

impl UreqTarget {
    pub fn new(base_url: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();

        UreqTarget {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }
}

#[async_trait]
impl HttpTarget for UreqTarget {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<TargetResponse, TargetError> {
        let url = format!("{}{}", self.base_url, path);
        let agent = self.agent.clone();
        let headers = headers.to_vec();
        let body = body.cloned();

        let result = tokio::task::spawn_blocking(move || {
            let response = match method {
                Method::Get => {
                    let mut request = agent.get(&url);
                    for (k, v) in &headers {
                        request = request.header(k.as_str(), v.as_str());
                    }
                    request.call()
                }
                Method::Post | Method::Put => {
                    let mut request = if method == Method::Post {
                        agent.post(&url)
                    } else {
                        agent.put(&url)
                    };
                    for (k, v) in &headers {
                        request = request.header(k.as_str(), v.as_str());
                    }
                    match &body {
                        Some(json) => request.send_json(json),
                        None => request.send_empty(),
                    }
                }
            }
            .map_err(|e| TargetError::new(e.to_string()))?;

            let status = response.status().as_u16();
            let resp_headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        v.to_str().unwrap_or("").to_string(),
                    )
                })
                .collect();
            let body_text = response
                .into_body()
                .read_to_string()
                .map_err(|e| TargetError::new(format!("failed to read response body: {}", e)))?;

            Ok(TargetResponse {
                status,
                headers: resp_headers,
                body: body_text,
            })
        })
        .await
        .map_err(|e| TargetError::new(format!("task join error: {}", e)))?;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = TargetResponse {
            status: 402,
            headers: vec![("X-Payment-Required".to_string(), "exact".to_string())],
            body: String::new(),
        };
        assert!(response.has_header("x-payment-required"));
        assert!(response.has_header("X-PAYMENT-REQUIRED"));
        assert!(!response.has_header("x-payment"));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let target = UreqTarget::new("http://localhost:9000/");
        assert_eq!(target.base_url(), "http://localhost:9000");
    }
}
