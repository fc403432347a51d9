//! paylens-core: protocol profiles and the intent lifecycle state machine.
//!
//! Four agentic commerce payment protocols are modeled behind one
//! [`ProtocolProfile`] trait:
//!
//! - [`Ap2Profile`] -- Google's Agent Payments Protocol (mandates, VDCs)
//! - [`X402Profile`] -- Coinbase's HTTP 402 micropayment protocol
//! - [`AcpProfile`] -- OpenAI/Stripe's Agentic Commerce Protocol (checkout)
//! - [`UcpProfile`] -- Universal Commerce Protocol (open standard)
//!
//! Every profile shares the canonical [`LifecycleState`] vocabulary so that
//! cross-protocol comparison is possible, while transition rules stay
//! protocol-specific. Profiles are value objects: constructed once,
//! never mutated, resolved through the read-only [`ProfileRegistry`].
//!
//! `execute_step` is a pure transition table -- the same inputs always
//! produce the same outputs, and a context with no matching condition is a
//! successful `no_transition`, not an error.

pub mod acp;
pub mod ap2;
pub mod model;
pub mod profile;
pub mod registry;
pub mod ucp;
pub mod x402;

pub use acp::AcpProfile;
pub use ap2::Ap2Profile;
pub use model::{
    ActionDescriptor, ControlCheck, ControlStatus, ErrorPattern, LifecycleState, ProfileMetadata,
    StateTransition, StepContext, StepOutcome, StepResult, ValidationError, ValidationReport,
};
pub use profile::ProtocolProfile;
pub use registry::ProfileRegistry;
pub use ucp::UcpProfile;
pub use x402::X402Profile;
