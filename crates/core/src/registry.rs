//! Read-only profile registry.
//!
//! The variant set is closed: four protocols, known at build time. The
//! registry is an immutable value constructed once at process start and
//! shared by reference with consumers; there are no module-level globals.

use crate::acp::AcpProfile;
use crate::ap2::Ap2Profile;
use crate::profile::ProtocolProfile;
use crate::ucp::UcpProfile;
use crate::x402::X402Profile;

/// Maps protocol codes to their profile implementations.
pub struct ProfileRegistry {
    profiles: Vec<(&'static str, Box<dyn ProtocolProfile>)>,
}

impl ProfileRegistry {
    /// Build the registry with all four protocol profiles in stable order.
    pub fn new() -> Self {
        ProfileRegistry {
            profiles: vec![
                ("AP2", Box::new(Ap2Profile) as Box<dyn ProtocolProfile>),
                ("x402", Box::new(X402Profile)),
                ("ACP", Box::new(AcpProfile)),
                ("UCP", Box::new(UcpProfile)),
            ],
        }
    }

    /// Resolve a protocol code to its profile. Matching is case-insensitive;
    /// unknown codes return `None`.
    pub fn get(&self, code: &str) -> Option<&dyn ProtocolProfile> {
        self.profiles
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, p)| p.as_ref())
    }

    /// Canonical codes in registration order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.profiles.iter().map(|(c, _)| *c).collect()
    }

    /// All registered profiles in registration order.
    pub fn profiles(&self) -> impl Iterator<Item = &dyn ProtocolProfile> {
        self.profiles.iter().map(|(_, p)| p.as_ref())
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        ProfileRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_all_four_protocols() {
        let registry = ProfileRegistry::new();
        assert_eq!(registry.codes(), vec!["AP2", "x402", "ACP", "UCP"]);
        for code in registry.codes() {
            assert!(registry.get(code).is_some());
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ProfileRegistry::new();
        assert_eq!(registry.get("x402").map(|p| p.name()), Some("x402"));
        assert_eq!(registry.get("X402").map(|p| p.name()), Some("x402"));
        assert_eq!(registry.get("ap2").map(|p| p.name()), Some("AP2"));
        assert!(registry.get("SEPA").is_none());
    }

    #[test]
    fn metadata_uses_wire_strings() {
        let registry = ProfileRegistry::new();
        let meta = registry.get("AP2").unwrap().metadata();
        assert_eq!(meta.name, "AP2");
        assert_eq!(meta.point_of_no_return, "awaiting_settlement");
        assert!(meta.lifecycle_states.contains(&"pending_approval".to_string()));
        assert!(meta.signature_coverage.contains_key("merchant"));
    }

    #[test]
    fn every_profile_declares_controls_and_error_patterns() {
        let registry = ProfileRegistry::new();
        for profile in registry.profiles() {
            assert!(!profile.security_controls().is_empty(), "{}", profile.name());
            assert!(!profile.error_patterns().is_empty(), "{}", profile.name());
            assert!(profile
                .lifecycle_states()
                .contains(&profile.point_of_no_return()));
        }
    }
}
