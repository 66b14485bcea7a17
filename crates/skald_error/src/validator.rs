//! Payload/filter validator transport error type.

/// Error returned when the external payload/filter validator cannot be
/// reached or answers malformed.
///
/// Distinct from a *negative validation result*, which is part of the
/// validator's normal output and maps to the `InvalidRichPayload` /
/// `InvalidFilterExpression` taxonomy kinds.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validator Error: {} at line {} in {}", message, line, file)]
pub struct ValidatorError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidatorError {
    /// Create a new ValidatorError with the given message at the current
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
