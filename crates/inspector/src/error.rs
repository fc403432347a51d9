/// Errors that terminate a run before any test executes. Everything that
/// happens while processing a single test is contained in that test's
/// `TestResult` instead.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// The requested protocol has no test table.
    #[error("unknown protocol: {protocol}")]
    UnknownProtocol { protocol: String },
}
