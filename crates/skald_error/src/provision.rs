//! Connection provisioning error taxonomy.

use crate::{DiscordApiError, EntitlementError, PublishError, RepositoryError, ValidatorError};

/// A single invalid field inside a rich-message payload.
///
/// Carries the validator's message along with the path of the offending field
/// (e.g. `components[0].text`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayloadFieldError {
    /// Human-readable description of what is wrong with the field.
    pub message: String,
    /// Path of the offending field inside the payload.
    pub path: String,
}

impl std::fmt::Display for PayloadFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Provisioning error conditions.
///
/// The first twelve variants form the user-facing taxonomy; `Repository`,
/// `Discord` and `Internal` are opaque and surface upstream as internal
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ProvisionErrorKind {
    /// The target channel does not exist or is not visible.
    #[display("Discord channel not found")]
    ChannelNotFound,
    /// The bot cannot view the target channel.
    #[display("Missing permission to view the Discord channel")]
    ChannelViewPermissionMissing,
    /// The bot cannot view or send messages in the target channel.
    #[display("Missing permission to view or send messages in the Discord channel")]
    ChannelSendPermissionMissing,
    /// A thread id resolved to a channel that is not a usable thread.
    #[display("Discord channel is not a valid type for this operation")]
    InvalidChannelType,
    /// The referenced webhook does not exist.
    #[display("Discord webhook {} does not exist", _0)]
    WebhookNotFound(String),
    /// The webhook exists but is not an incoming webhook the bot can use.
    #[display("Discord webhook {} is not an incoming webhook", _0)]
    InvalidWebhookType(String),
    /// The caller does not manage the guild that owns the webhook.
    #[display("User does not manage the guild of webhook {}", _0)]
    WebhookUserPermissionMissing(String),
    /// The bot lacks webhook permissions in the target channel.
    #[display("Missing permission to manage webhooks in the Discord channel")]
    WebhookPermissionMissing,
    /// The feed owner lacks the supporter entitlement required for webhooks.
    #[display("User must be a supporter to use webhooks")]
    InsufficientEntitlement,
    /// One error per invalid clause in the filter expression.
    #[display("Filter expression is invalid ({} problems)", _0.len())]
    InvalidFilterExpression(Vec<String>),
    /// One error per offending field path in the rich-message payload.
    #[display("Rich-message payload is invalid ({} problems)", _0.len())]
    InvalidRichPayload(Vec<PayloadFieldError>),
    /// The feed or connection being operated on does not exist.
    #[display("Connection not found: {}", _0)]
    ConnectionNotFound(String),
    /// Persistence failure (opaque).
    #[display("Repository error: {}", _0)]
    Repository(String),
    /// Unrecognized Discord API failure (opaque).
    #[display("Discord API error: {}", _0)]
    Discord(String),
    /// Invariant violation or contract breach (opaque).
    #[display("Internal error: {}", _0)]
    Internal(String),
}

/// Provisioning error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provision Error: {} at line {} in {}", kind, line, file)]
pub struct ProvisionError {
    /// The kind of error that occurred
    pub kind: ProvisionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProvisionError {
    /// Create a new ProvisionError with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use skald_error::{ProvisionError, ProvisionErrorKind};
    ///
    /// let err = ProvisionError::new(ProvisionErrorKind::ChannelNotFound);
    /// assert!(format!("{}", err).contains("not found"));
    /// ```
    #[track_caller]
    pub fn new(kind: ProvisionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an opaque internal error from an invariant-violation message.
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::Internal(message.into()))
    }

    /// Whether this error belongs to the user-facing taxonomy.
    ///
    /// Opaque `Repository`/`Discord`/`Internal` kinds surface upstream as
    /// internal errors instead.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self.kind,
            ProvisionErrorKind::Repository(_)
                | ProvisionErrorKind::Discord(_)
                | ProvisionErrorKind::Internal(_)
        )
    }
}

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

impl From<RepositoryError> for ProvisionError {
    #[track_caller]
    fn from(err: RepositoryError) -> Self {
        ProvisionError::new(ProvisionErrorKind::Repository(err.to_string()))
    }
}

impl From<DiscordApiError> for ProvisionError {
    #[track_caller]
    fn from(err: DiscordApiError) -> Self {
        ProvisionError::new(ProvisionErrorKind::Discord(err.to_string()))
    }
}

impl From<EntitlementError> for ProvisionError {
    #[track_caller]
    fn from(err: EntitlementError) -> Self {
        ProvisionError::new(ProvisionErrorKind::Internal(err.to_string()))
    }
}

impl From<ValidatorError> for ProvisionError {
    #[track_caller]
    fn from(err: ValidatorError) -> Self {
        ProvisionError::new(ProvisionErrorKind::Internal(err.to_string()))
    }
}

impl From<PublishError> for ProvisionError {
    #[track_caller]
    fn from(err: PublishError) -> Self {
        ProvisionError::new(ProvisionErrorKind::Internal(err.to_string()))
    }
}
