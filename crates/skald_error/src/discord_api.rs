//! Discord REST API error type.

/// Error returned by the Discord REST client collaborator.
///
/// Carries the HTTP status code when the remote API answered at all, so the
/// validators can translate 403/404 responses into the user-facing taxonomy.
/// Transport failures (timeouts, connection resets) have no status and always
/// propagate opaque.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Discord API Error ({}): {} at line {} in {}", status.map(|s| s.to_string()).unwrap_or_else(|| "transport".into()), message, line, file)]
pub struct DiscordApiError {
    /// HTTP status code, if the remote API responded.
    pub status: Option<u16>,
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl DiscordApiError {
    /// Create a new DiscordApiError for a response with an HTTP status.
    #[track_caller]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            status: Some(status),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a new DiscordApiError for a transport-level failure.
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            status: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the remote API reported the resource missing.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Whether the remote API reported a permission failure.
    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }
}
