//! Validates that every intent schema published by every profile compiles
//! as a JSON Schema, and that the hand-rolled structural validators agree
//! with the schemas on required top-level fields.

use paylens_core::ProfileRegistry;

#[test]
fn every_intent_schema_compiles() {
    let registry = ProfileRegistry::new();
    let mut tested = 0usize;
    let mut failures = Vec::new();

    for profile in registry.profiles() {
        for intent_type in profile.intent_types() {
            let schema = profile
                .intent_schema(intent_type)
                .unwrap_or_else(|| panic!("{}: no schema for {}", profile.name(), intent_type));
            if let Err(e) = jsonschema::validator_for(&schema) {
                failures.push(format!("{}/{}: {}", profile.name(), intent_type, e));
            }
            tested += 1;
        }
    }

    assert!(tested > 0, "no intent schemas found");
    assert!(failures.is_empty(), "invalid schemas:\n{}", failures.join("\n"));
}

#[test]
fn primary_intent_types_reject_empty_payloads() {
    let registry = ProfileRegistry::new();
    let empty = serde_json::json!({});

    // The first intent type of each protocol carries required fields the
    // structural validator must enforce (UCP's CatalogRequest requires
    // nothing, so its OfferRequest is checked instead).
    let cases = [
        ("AP2", "CartMandate"),
        ("x402", "PaymentRequired"),
        ("ACP", "CheckoutSession"),
        ("UCP", "OfferRequest"),
    ];

    for (code, intent_type) in cases {
        let profile = registry.get(code).unwrap();
        let report = profile.validate_intent(intent_type, &empty);
        assert!(!report.valid, "{}/{} accepted an empty payload", code, intent_type);
        for error in &report.errors {
            assert!(
                error.message.contains(&error.field) || error.message.contains("field"),
                "{}/{}: error message does not name the field: {}",
                code,
                intent_type,
                error.message
            );
        }
    }
}

#[test]
fn unknown_intent_type_is_not_found_not_an_error() {
    let registry = ProfileRegistry::new();
    for profile in registry.profiles() {
        assert!(profile.intent_schema("NoSuchIntent").is_none());
        // Validation of an unknown type has no rules to violate.
        let report = profile.validate_intent("NoSuchIntent", &serde_json::json!({}));
        assert!(report.valid);
    }
}
