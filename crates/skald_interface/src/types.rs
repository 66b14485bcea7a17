//! Data types crossing the collaborator boundaries.

use serde::{Deserialize, Serialize};
use skald_core::{
    ChannelRef, Connection, ConnectionId, CustomPlaceholder, DeliveryRateLimit, DisabledCode,
    DiscordChannelKind, FeedId, FilterExpression, Mentions, RichPayload, SplitOptions, WebhookRef,
};
use skald_error::PayloadFieldError;

/// A channel as returned by the Discord REST client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordChannel {
    /// Channel id.
    pub id: String,
    /// Guild the channel belongs to.
    pub guild_id: String,
    /// Raw channel type.
    pub kind: DiscordChannelKind,
    /// Parent channel id, for threads.
    pub parent_id: Option<String>,
}

/// Raw Discord webhook types, by wire discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscordWebhookKind {
    /// Token-addressable webhook the bot can post through (type 1).
    Incoming,
    /// Channel-follower webhook (type 2).
    ChannelFollower,
    /// Application (interaction) webhook (type 3).
    Application,
}

impl DiscordWebhookKind {
    /// Decode a raw wire discriminant.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Incoming),
            2 => Some(Self::ChannelFollower),
            3 => Some(Self::Application),
            _ => None,
        }
    }
}

/// A webhook as returned by the Discord REST client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordWebhook {
    /// Webhook id.
    pub id: String,
    /// Raw webhook type.
    pub kind: DiscordWebhookKind,
    /// Delivery token; absent on webhooks the bot cannot post through.
    pub token: Option<String>,
    /// Guild the webhook belongs to, when reported.
    pub guild_id: Option<String>,
    /// Channel the webhook posts into.
    pub channel_id: String,
    /// Webhook display name.
    pub name: Option<String>,
}

/// How strictly to probe the bot's permissions on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionProbe {
    /// Require only that the bot can view the channel.
    ViewOnly,
    /// Require that the bot can view the channel and send messages in it.
    ViewAndSend,
}

/// Outcome of rich-message payload validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RichPayloadValidation {
    /// Payload accepted; `sanitized` is the value to persist (unknown fields
    /// dropped by the validator).
    Valid {
        /// The sanitized payload to adopt.
        sanitized: RichPayload,
    },
    /// Payload rejected, one error per offending field path.
    Invalid {
        /// Per-field validation errors.
        errors: Vec<PayloadFieldError>,
    },
}

/// A field update inside a [`ConnectionPatch`].
///
/// `Keep` leaves the stored value untouched; `Clear` unsets it; `Set` replaces
/// it. The three-way split keeps "not mentioned" distinct from "remove".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchField<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Unset the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> PatchField<T> {
    /// Whether this update changes anything.
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Apply this update to an optional stored value.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }
}

/// Destination change inside a [`ConnectionPatch`].
///
/// Switching branch must null the vacated branch in storage; records that
/// predate the destination sum type may still carry both fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPatch {
    /// Bind to a channel; the stored webhook branch is nulled.
    Channel(ChannelRef),
    /// Bind to a webhook; the stored channel branch is nulled.
    Webhook(WebhookRef),
}

/// Changed fields of one connection, applied by a single conditional update
/// matched on `(feed_id, connection_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPatch {
    /// New display name.
    pub name: Option<String>,
    /// Destination change.
    pub destination: Option<DestinationPatch>,
    /// Filter update.
    #[serde(default)]
    pub filters: PatchField<FilterExpression>,
    /// Sanitized rich-payload replacement.
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

/// Which feeds a connection is cloned into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneFeedSelection {
    /// An explicit list of target feeds.
    Selected(Vec<FeedId>),
    /// Every feed owned by the user, optionally narrowed by a search string
    /// matched against feed title and url.
    OwnedBy {
        /// Owner whose feeds are targeted.
        discord_user_id: String,
        /// Optional narrowing search string.
        search: Option<String>,
    },
}

/// Bulk request cloning one connection into many feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct CloneConnectionsRequest {
    /// Target feed selection.
    pub selection: CloneFeedSelection,
    /// The connection to insert into each target feed; the repository
    /// assigns each copy a fresh connection id.
    pub connection: Connection,
}

/// A `(feed, connection)` pair created by a bulk clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedConnection {
    /// Feed the clone was inserted into.
    pub feed_id: FeedId,
    /// Id assigned to the clone.
    pub connection_id: ConnectionId,
}

/// Notification that connections were created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionCreatedEvent {
    /// Feed the connection was created on.
    pub feed_id: FeedId,
    /// The created connection.
    pub connection_id: ConnectionId,
    /// Discord user who performed the creation.
    pub actor_discord_user_id: String,
}

/// Notification that connections were deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDeletedEvent {
    /// Feed the connections were deleted from.
    pub feed_id: FeedId,
    /// Ids of the deleted connections.
    pub deleted_connection_ids: Vec<ConnectionId>,
    /// The feed's share-invite bookkeeping at deletion time, forwarded
    /// verbatim for pending-invite cleanup.
    pub share_state: Option<serde_json::Value>,
}
