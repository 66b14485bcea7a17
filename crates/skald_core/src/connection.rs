//! Connections and their delivery destinations.

use crate::{
    ChannelKind, ComponentRow, ConnectionId, CustomPlaceholder, DeliveryRateLimit, DisabledCode,
    Embed, FilterExpression, FormatterOptions, Mentions, PlaceholderLimit, RichPayload,
    SplitOptions, WebhookKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A channel delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    /// Discord channel id.
    pub id: String,
    /// Guild the channel belongs to.
    pub guild_id: String,
    /// Classified channel type.
    pub kind: ChannelKind,
    /// Parent channel id, for threads.
    pub parent_channel_id: Option<String>,
}

/// A webhook delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRef {
    /// Discord webhook id.
    pub id: String,
    /// Webhook delivery token.
    pub token: String,
    /// Guild the webhook belongs to.
    pub guild_id: String,
    /// Channel the webhook posts into.
    pub channel_id: String,
    /// Display name override.
    pub name: Option<String>,
    /// Avatar override URL.
    pub icon_url: Option<String>,
    /// Thread the webhook posts into, if any.
    pub thread_id: Option<String>,
    /// Classified webhook delivery type.
    pub kind: Option<WebhookKind>,
    /// Whether the webhook was created and is lifecycle-managed by this
    /// application. User-owned webhooks are never deleted by the system.
    pub is_application_owned: bool,
}

/// The delivery destination of a bound connection.
///
/// A connection delivers to exactly one of a channel or a webhook; the sum
/// type makes "both" and "neither" unrepresentable. Records that predate this
/// invariant are normalized at the persistence boundary, which still nulls
/// the inactive branch explicitly on every switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Deliver by posting into a channel as the bot.
    Channel(ChannelRef),
    /// Deliver through a webhook.
    Webhook(WebhookRef),
}

impl Destination {
    /// The bound channel, if channel-bound.
    pub fn channel(&self) -> Option<&ChannelRef> {
        match self {
            Self::Channel(c) => Some(c),
            Self::Webhook(_) => None,
        }
    }

    /// The bound webhook, if webhook-bound.
    pub fn webhook(&self) -> Option<&WebhookRef> {
        match self {
            Self::Channel(_) => None,
            Self::Webhook(w) => Some(w),
        }
    }

    /// Mutable access to the bound webhook, if webhook-bound.
    pub fn webhook_mut(&mut self) -> Option<&mut WebhookRef> {
        match self {
            Self::Channel(_) => None,
            Self::Webhook(w) => Some(w),
        }
    }

    /// Whether this destination is an application-owned webhook with the
    /// given id.
    pub fn is_application_webhook(&self, webhook_id: &str) -> bool {
        self.webhook()
            .is_some_and(|w| w.is_application_owned && w.id == webhook_id)
    }
}

/// Destination plus message-shaping settings of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    /// Where articles are delivered.
    pub destination: Destination,
    /// Embeds attached to delivered messages.
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// Message text template.
    pub content: Option<String>,
    /// Sanitized rich-message payload.
    pub rich_payload: Option<RichPayload>,
    /// Text formatter toggles.
    #[serde(default)]
    pub formatter: FormatterOptions,
    /// Per-placeholder truncation limits.
    #[serde(default)]
    pub placeholder_limits: Vec<PlaceholderLimit>,
    /// Message component rows.
    #[serde(default)]
    pub component_rows: Vec<ComponentRow>,
    /// Title template for forum posts.
    pub forum_thread_title: Option<String>,
    /// Tag ids applied to forum posts.
    #[serde(default)]
    pub forum_thread_tags: Vec<String>,
    /// Substitute a fallback when a placeholder resolves empty.
    #[serde(default)]
    pub enable_placeholder_fallback: bool,
}

impl ConnectionDetails {
    /// Details bound to the given destination, all other settings empty.
    pub fn bound_to(destination: Destination) -> Self {
        Self {
            destination,
            embeds: Vec::new(),
            content: None,
            rich_payload: None,
            formatter: FormatterOptions::default(),
            placeholder_limits: Vec::new(),
            component_rows: Vec::new(),
            forum_thread_title: None,
            forum_thread_tags: Vec::new(),
            enable_placeholder_fallback: false,
        }
    }
}

/// The binding between a feed and one delivery destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Connection id, unique within the owning feed.
    pub id: ConnectionId,
    /// Display name.
    pub name: String,
    /// Why the connection is disabled, if it is.
    pub disabled_code: Option<DisabledCode>,
    /// Free-form detail accompanying the disabled code.
    pub disabled_detail: Option<String>,
    /// Article filters; absent means deliver everything.
    pub filters: Option<FilterExpression>,
    /// Long-message split options.
    pub split_options: Option<SplitOptions>,
    /// Mentions applied to delivered messages.
    pub mentions: Option<Mentions>,
    /// Per-connection delivery rate limits.
    #[serde(default)]
    pub rate_limits: Vec<DeliveryRateLimit>,
    /// Custom placeholders usable from templates.
    #[serde(default)]
    pub custom_placeholders: Vec<CustomPlaceholder>,
    /// Destination and message-shaping settings.
    pub details: ConnectionDetails,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// A freshly bound connection with the given id, name and destination.
    pub fn bound(id: ConnectionId, name: impl Into<String>, destination: Destination) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            disabled_code: None,
            disabled_detail: None,
            filters: None,
            split_options: None,
            mentions: None,
            rate_limits: Vec::new(),
            custom_placeholders: Vec::new(),
            details: ConnectionDetails::bound_to(destination),
            created_at: now,
            updated_at: now,
        }
    }
}
