//! Plain-data inputs of the exposed provisioning operations.
//!
//! The HTTP layer deserializes request bodies into these types; the service
//! consumes them and returns domain values or a typed error.

use serde::{Deserialize, Serialize};
use skald_core::{
    Connection, ConnectionId, CopyableProperty, CustomPlaceholder, DeliveryRateLimit, DisabledCode,
    Embed, Feed, FeedId, FilterExpression, Mentions, RichPayload, SplitOptions,
};
use skald_interface::PatchField;

/// How a channel connection posts articles into its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadCreationMethod {
    /// Open a new thread per article instead of posting directly.
    NewThread,
}

/// The delivery destination requested for a connection.
///
/// Exactly one destination per connection is a contract of the operation; the
/// sum type makes a violation unrepresentable rather than a runtime check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionTarget {
    /// Deliver into a channel as the bot.
    Channel {
        /// Target channel id.
        channel_id: String,
        /// Optional per-article thread creation.
        thread_creation: Option<ThreadCreationMethod>,
    },
    /// Deliver through a webhook the user already owns.
    UserWebhook {
        /// Id of the user-owned webhook.
        webhook_id: String,
        /// Display name override.
        name: Option<String>,
        /// Avatar override URL.
        icon_url: Option<String>,
        /// Thread to post into.
        thread_id: Option<String>,
    },
    /// Deliver through a webhook the application provisions on the channel.
    ApplicationWebhook {
        /// Channel to provision the webhook on.
        channel_id: String,
        /// Display name override.
        name: Option<String>,
        /// Avatar override URL.
        icon_url: Option<String>,
        /// Thread to post into.
        thread_id: Option<String>,
    },
}

impl ConnectionTarget {
    /// Whether this target delivers through a webhook.
    pub fn is_webhook(&self) -> bool {
        matches!(
            self,
            Self::UserWebhook { .. } | Self::ApplicationWebhook { .. }
        )
    }
}

/// Input of [`create`](crate::ConnectionProvisioningService::create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConnectionInput {
    /// Display name of the new connection.
    pub name: String,
    /// OAuth access token of the acting user.
    pub access_token: String,
    /// Discord user id of the acting user.
    pub actor_discord_user_id: String,
    /// Requested delivery destination.
    pub target: ConnectionTarget,
    /// Embeds attached to delivered messages.
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// Message text template.
    pub content: Option<String>,
    /// Rich-message payload; validated externally, the sanitized value is
    /// what gets persisted.
    pub rich_payload: Option<RichPayload>,
}

/// Field updates of [`update`](crate::ConnectionProvisioningService::update).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateConnectionInput {
    /// New display name.
    pub name: Option<String>,
    /// New delivery destination; switching branch nulls the vacated branch
    /// in storage.
    pub target: Option<ConnectionTarget>,
    /// Filter update.
    #[serde(default)]
    pub filters: PatchField<FilterExpression>,
    /// New rich-message payload.
    pub rich_payload: Option<RichPayload>,
    /// Split-options update.
    #[serde(default)]
    pub split_options: PatchField<SplitOptions>,
    /// Disabled-code update.
    #[serde(default)]
    pub disabled_code: PatchField<DisabledCode>,
    /// Mentions replacement.
    pub mentions: Option<Mentions>,
    /// Rate-limit replacement.
    pub rate_limits: Option<Vec<DeliveryRateLimit>>,
    /// Custom-placeholder replacement.
    pub custom_placeholders: Option<Vec<CustomPlaceholder>>,
}

/// Full request of [`update`](crate::ConnectionProvisioningService::update).
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateConnectionRequest {
    /// OAuth access token of the acting user.
    pub access_token: String,
    /// The feed owning the connection, as already fetched by the caller.
    pub feed: Feed,
    /// The connection as it was before this update.
    pub old_connection: Connection,
    /// The requested field updates.
    pub updates: UpdateConnectionInput,
}

/// Which feeds receive the clone of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneTarget {
    /// An explicit list of target feeds.
    SelectedFeeds(Vec<FeedId>),
    /// All of the actor's feeds, optionally narrowed by a search string.
    OwnedFeeds {
        /// Optional narrowing search string.
        search: Option<String>,
    },
}

/// Input of
/// [`clone_connection`](crate::ConnectionProvisioningService::clone_connection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneConnectionInput {
    /// Display name given to every clone.
    pub name: String,
    /// Which feeds receive a clone.
    pub target: CloneTarget,
    /// Replacement channel for the clones; revalidated before use.
    pub channel_id: Option<String>,
}

/// Input of
/// [`copy_settings`](crate::ConnectionProvisioningService::copy_settings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopySettingsInput {
    /// Connections on the same feed that receive the copied settings.
    pub target_connection_ids: Vec<ConnectionId>,
    /// Which settings to copy; anything not listed is left untouched.
    pub properties: Vec<CopyableProperty>,
}
