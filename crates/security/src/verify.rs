//! Primitive format validators.
//!
//! These check shape, not cryptography: a production verifier would
//! reconstruct the EIP-712 typed-data hash and recover the signer; here we
//! validate prefixes, lengths, and hex content so that malformed payloads
//! are caught before any settlement simulation.

use std::collections::HashSet;

use serde_json::Value;

/// Outcome of a single primitive validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEval {
    pub passed: bool,
    pub message: String,
}

impl CheckEval {
    pub fn pass(message: impl Into<String>) -> Self {
        CheckEval {
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        CheckEval {
            passed: false,
            message: message.into(),
        }
    }
}

/// Validate EVM signature format: `0x` prefix, 65 bytes (132 chars), hex.
pub fn verify_evm_signature(signature: &str) -> CheckEval {
    if !signature.starts_with("0x") {
        return CheckEval::fail("Signature must start with 0x");
    }

    // 65 bytes = 130 hex chars + 0x = 132.
    if signature.len() != 132 {
        return CheckEval::fail(format!(
            "Invalid signature length: expected 132, got {}",
            signature.len()
        ));
    }

    if !signature[2..].bytes().all(|b| b.is_ascii_hexdigit()) {
        return CheckEval::fail("Signature contains invalid hex characters");
    }

    CheckEval::pass("Valid EVM signature format")
}

/// Validate an EIP-712 payment authorization: signature format, required
/// authorization fields, and 20-byte address shapes for `from`/`to`.
pub fn verify_eip712_signature(signature: &str, authorization: &Value) -> CheckEval {
    let format = verify_evm_signature(signature);
    if !format.passed {
        return format;
    }

    for field in ["from", "to", "value", "validAfter", "validBefore", "nonce"] {
        if authorization.get(field).is_none() {
            return CheckEval::fail(format!("Missing authorization field: {}", field));
        }
    }

    for addr_field in ["from", "to"] {
        let addr = authorization
            .get(addr_field)
            .and_then(Value::as_str)
            .unwrap_or("");
        if !addr.starts_with("0x") || addr.len() != 42 {
            return CheckEval::fail(format!("Invalid address format for {}", addr_field));
        }
    }

    CheckEval::pass("EIP-712 signature format valid")
}

/// Replay protection: the nonce must be unseen and a 32-byte hex value.
/// The used-nonce set is owned by the caller, never by the analyzer.
pub fn verify_nonce(nonce: &str, used_nonces: &HashSet<String>) -> CheckEval {
    if used_nonces.contains(nonce) {
        return CheckEval::fail("Nonce already used - potential replay attack");
    }

    // 32 bytes = 64 hex chars + 0x = 66.
    if !nonce.starts_with("0x") || nonce.len() != 66 {
        return CheckEval::fail(format!(
            "Invalid nonce format: expected 66 chars, got {}",
            nonce.len()
        ));
    }

    CheckEval::pass("Nonce is unique and valid")
}

/// Check `now` against a `[validAfter, validBefore]` window of
/// decimal-string UNIX seconds.
pub fn verify_time_window(valid_after: &str, valid_before: &str, now: i64) -> CheckEval {
    let after: i64 = match valid_after.trim().parse() {
        Ok(v) => v,
        Err(e) => return CheckEval::fail(format!("Invalid timestamp format: {}", e)),
    };
    let before: i64 = match valid_before.trim().parse() {
        Ok(v) => v,
        Err(e) => return CheckEval::fail(format!("Invalid timestamp format: {}", e)),
    };

    if now < after {
        return CheckEval::fail(format!(
            "Authorization not yet valid (starts in {}s)",
            after - now
        ));
    }

    if now > before {
        return CheckEval::fail(format!("Authorization expired ({}s ago)", now - before));
    }

    CheckEval::pass(format!("Within valid time window ({}s remaining)", before - now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hex_string(prefix: &str, len: usize) -> String {
        let mut s = String::from(prefix);
        while s.len() < len {
            s.push('a');
        }
        s
    }

    #[test]
    fn evm_signature_format_boundaries() {
        let good = hex_string("0x", 132);
        assert!(verify_evm_signature(&good).passed);

        let no_prefix = hex_string("ab", 132);
        assert_eq!(
            verify_evm_signature(&no_prefix).message,
            "Signature must start with 0x"
        );

        let short = hex_string("0x", 130);
        assert_eq!(
            verify_evm_signature(&short).message,
            "Invalid signature length: expected 132, got 130"
        );

        let mut bad_hex = hex_string("0x", 131);
        bad_hex.push('g');
        assert_eq!(
            verify_evm_signature(&bad_hex).message,
            "Signature contains invalid hex characters"
        );
    }

    #[test]
    fn eip712_requires_authorization_fields() {
        let sig = hex_string("0x", 132);
        let auth = json!({
            "from": hex_string("0x", 42),
            "to": hex_string("0x", 42),
            "value": "1000",
            "validAfter": "0",
            "validBefore": "99999999999",
        });
        let eval = verify_eip712_signature(&sig, &auth);
        assert!(!eval.passed);
        assert_eq!(eval.message, "Missing authorization field: nonce");
    }

    #[test]
    fn eip712_checks_address_shapes() {
        let sig = hex_string("0x", 132);
        let auth = json!({
            "from": "0xshort",
            "to": hex_string("0x", 42),
            "value": "1",
            "validAfter": "0",
            "validBefore": "1",
            "nonce": hex_string("0x", 66),
        });
        let eval = verify_eip712_signature(&sig, &auth);
        assert_eq!(eval.message, "Invalid address format for from");
    }

    #[test]
    fn fresh_nonce_passes_reused_nonce_fails() {
        let nonce = hex_string("0x", 66);
        let mut used = HashSet::new();

        let eval = verify_nonce(&nonce, &used);
        assert!(eval.passed);

        used.insert(nonce.clone());
        let eval = verify_nonce(&nonce, &used);
        assert!(!eval.passed);
        assert_eq!(eval.message, "Nonce already used - potential replay attack");
    }

    #[test]
    fn malformed_nonce_reports_length() {
        let eval = verify_nonce("0x1234", &HashSet::new());
        assert_eq!(eval.message, "Invalid nonce format: expected 66 chars, got 6");
    }

    #[test]
    fn time_window_edges() {
        // now inside the window
        assert!(verify_time_window("100", "200", 150).passed);
        // window bounds are inclusive
        assert!(verify_time_window("100", "200", 100).passed);
        assert!(verify_time_window("100", "200", 200).passed);
        // before the window
        let eval = verify_time_window("100", "200", 40);
        assert_eq!(eval.message, "Authorization not yet valid (starts in 60s)");
        // after the window
        let eval = verify_time_window("100", "200", 260);
        assert_eq!(eval.message, "Authorization expired (60s ago)");
    }

    #[test]
    fn unparsable_timestamp_fails_closed() {
        let eval = verify_time_window("soon", "later", 0);
        assert!(!eval.passed);
        assert!(eval.message.starts_with("Invalid timestamp format:"));
    }
}
