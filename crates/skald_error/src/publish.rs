//! Connection event publisher error type.

/// Error returned by the connection event publisher collaborator.
///
/// Event publication is best-effort on every provisioning path; this error is
/// logged by the service and never reaches the caller of the triggering
/// operation.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Publish Error: {} at line {} in {}", message, line, file)]
pub struct PublishError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl PublishError {
    /// Create a new PublishError with the given message at the current
    /// location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
