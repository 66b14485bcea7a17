//! Collaborator contracts consumed by the provisioning service.

use crate::{
    CloneConnectionsRequest, ConnectionCreatedEvent, ConnectionDeletedEvent, ConnectionPatch,
    CreatedConnection, DiscordChannel, DiscordWebhook, PermissionProbe, RichPayloadValidation,
};
use async_trait::async_trait;
use skald_core::{Connection, ConnectionId, Feed, FeedId, FilterExpression, RichPayload};
use skald_error::{
    DiscordApiError, EntitlementError, PublishError, RepositoryError, ValidatorError,
};

/// Persistence boundary for feeds and their embedded connections.
///
/// Every mutation is a single conditional write; callers derive success or
/// failure strictly from that write's result, never from a separate
/// read-then-write pair.
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Load a feed by id.
    async fn find_by_id(&self, feed_id: &FeedId) -> Result<Option<Feed>, RepositoryError>;

    /// Append a connection to the feed's list in one conditional push.
    ///
    /// Returns the post-write feed, or `None` when no feed matched.
    async fn append_connection(
        &self,
        feed_id: &FeedId,
        connection: Connection,
    ) -> Result<Option<Feed>, RepositoryError>;

    /// Apply a patch to one connection in one conditional update matched on
    /// `(feed_id, connection_id)`.
    ///
    /// Returns the post-write feed, or `None` when no such pair matched.
    async fn update_connection(
        &self,
        feed_id: &FeedId,
        connection_id: &ConnectionId,
        patch: ConnectionPatch,
    ) -> Result<Option<Feed>, RepositoryError>;

    /// Remove a connection in one conditional pull.
    ///
    /// Returns whether a document was modified.
    async fn remove_connection(
        &self,
        feed_id: &FeedId,
        connection_id: &ConnectionId,
    ) -> Result<bool, RepositoryError>;

    /// Replace the feed's entire connection list in one write.
    async fn replace_connections(
        &self,
        feed_id: &FeedId,
        connections: Vec<Connection>,
    ) -> Result<(), RepositoryError>;

    /// Count feeds with at least one connection delivering through the given
    /// webhook id.
    async fn count_feeds_by_webhook(&self, webhook_id: &str) -> Result<u64, RepositoryError>;

    /// Find one feed with a connection delivering through the given webhook
    /// id.
    async fn find_one_by_webhook(&self, webhook_id: &str) -> Result<Option<Feed>, RepositoryError>;

    /// Insert a copy of the given connection into every selected feed.
    ///
    /// Returns the `(feed_id, connection_id)` pairs actually created.
    async fn clone_connection_to_feeds(
        &self,
        request: CloneConnectionsRequest,
    ) -> Result<Vec<CreatedConnection>, RepositoryError>;
}

/// Discord REST client boundary.
///
/// Calls are not auto-retried; timeouts and 5xx responses propagate as
/// opaque [`DiscordApiError`]s.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Fetch a channel as the bot.
    async fn get_channel(&self, channel_id: &str) -> Result<DiscordChannel, DiscordApiError>;

    /// Fetch a channel while asserting the caller and bot can use it.
    ///
    /// The probe selects relaxed (view-only) or strict (view and send)
    /// permission assertions; failures surface as 403s.
    async fn can_use_channel(
        &self,
        channel_id: &str,
        access_token: &str,
        probe: PermissionProbe,
    ) -> Result<DiscordChannel, DiscordApiError>;

    /// Fetch a webhook; `None` when it does not exist.
    async fn get_webhook(&self, webhook_id: &str)
    -> Result<Option<DiscordWebhook>, DiscordApiError>;

    /// Create a webhook on a channel.
    async fn create_webhook(
        &self,
        channel_id: &str,
        name: &str,
    ) -> Result<DiscordWebhook, DiscordApiError>;

    /// Delete a webhook.
    async fn delete_webhook(&self, webhook_id: &str) -> Result<(), DiscordApiError>;

    /// List a channel's webhooks, optionally only those owned by this
    /// application.
    async fn channel_webhooks(
        &self,
        channel_id: &str,
        application_owned_only: bool,
    ) -> Result<Vec<DiscordWebhook>, DiscordApiError>;
}

/// Entitlement lookups, consumed as an opaque boolean.
#[async_trait]
pub trait Entitlements: Send + Sync {
    /// Whether the Discord user holds the supporter entitlement.
    async fn is_supporter(&self, discord_user_id: &str) -> Result<bool, EntitlementError>;
}

/// Guild-level authorization checks against the caller's access token.
#[async_trait]
pub trait GuildAuthorization: Send + Sync {
    /// Whether the token's user manages the given guild.
    async fn user_manages_guild(
        &self,
        access_token: &str,
        guild_id: &str,
    ) -> Result<bool, DiscordApiError>;
}

/// External validator for rich payloads and filter expressions.
#[async_trait]
pub trait PayloadValidator: Send + Sync {
    /// Validate a rich-message payload, returning the sanitized value on
    /// success.
    async fn validate_rich_payload(
        &self,
        payload: &RichPayload,
    ) -> Result<RichPayloadValidation, ValidatorError>;

    /// Validate a filter expression, returning one message per invalid
    /// clause (empty means valid).
    async fn validate_filter_expression(
        &self,
        expression: &FilterExpression,
    ) -> Result<Vec<String>, ValidatorError>;
}

/// Downstream bookkeeping notified of connection lifecycle events.
#[async_trait]
pub trait ConnectionEventPublisher: Send + Sync {
    /// Notify that connections were created.
    async fn notify_created(&self, events: &[ConnectionCreatedEvent]) -> Result<(), PublishError>;

    /// Notify that connections were deleted.
    async fn notify_deleted(&self, event: &ConnectionDeletedEvent) -> Result<(), PublishError>;
}
