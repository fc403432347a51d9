//! paylens-security: weighted security scoring for payment messages.
//!
//! Stateless, side-effect-free analysis of a single payment message
//! against a fixed, weighted rule set: signature presence and format,
//! nonce replay protection, time-window validity, amount sufficiency, and
//! recipient correctness.
//!
//! Verification here is format/shape only -- there is no ECDSA recovery
//! and no chain access. Replay state is supplied by the caller as a
//! used-nonce set; the analyzer owns nothing, so concurrent callers each
//! hold their own set and need no locking.
//!
//! Two entry points share one check registry so scores stay comparable
//! across protocols: [`analyze_x402_payment`] runs all six checks against
//! a micropayment payload, [`analyze_ap2_mandate`] runs the three
//! mandate-structure checks under the same weight ids.

pub mod analyze;
pub mod registry;
pub mod score;
pub mod verify;

pub use analyze::{analyze_ap2_mandate, analyze_x402_payment, SecurityAnalysis, SecurityCheck};
pub use registry::{spec_for, CheckSpec, Severity, SECURITY_CHECKS};
pub use score::{calculate_security_score, grade_for, summarize};
pub use verify::{
    verify_eip712_signature, verify_evm_signature, verify_nonce, verify_time_window, CheckEval,
};
