//! Feed repository error type.

/// Error returned by the feed repository collaborator.
///
/// The persistence engine is out of scope; its failures are opaque to the
/// provisioning service and surface upstream as internal errors.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Repository Error: {} at line {} in {}", message, line, file)]
pub struct RepositoryError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl RepositoryError {
    /// Create a new RepositoryError with the given message at the current
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
