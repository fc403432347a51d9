//! paylens-inspector: compliance test runner for live protocol servers.
//!
//! Drives a weighted, dependency-ordered test suite against an external
//! server and produces a pass/fail/score report. Failure isolation is the
//! key design property: every test always yields a `TestResult`, and a
//! single broken endpoint never aborts assessment of the rest of the
//! target implementation.
//!
//! Tests execute strictly in sequence within a run -- later tests read
//! context (a captured checkout id, a stored response body) written by
//! earlier ones. Separate runs share nothing but the immutable test
//! tables, so they may execute concurrently.

pub mod catalog;
pub mod error;
pub mod report;
pub mod runner;
pub mod target;

pub use catalog::{CheckKind, TestCatalog, TestDefinition};
pub use error::InspectError;
pub use report::{TestReport, TestResult};
pub use runner::ComplianceRunner;
pub use target::{HttpTarget, Method, TargetError, TargetResponse, UreqTarget};
