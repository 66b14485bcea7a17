//! Entitlement lookup error type.

/// Error returned by the entitlements collaborator.
///
/// Entitlement lookups are consumed as an opaque boolean; their failures are
/// likewise opaque to the provisioning service and surface upstream as
/// internal errors.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Entitlement Error: {} at line {} in {}", message, line, file)]
pub struct EntitlementError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl EntitlementError {
    /// Create a new EntitlementError with the given message at the current
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
