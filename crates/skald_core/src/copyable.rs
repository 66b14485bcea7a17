//! Whitelist of connection settings that `copy_settings` may transfer.

use serde::{Deserialize, Serialize};

/// A connection setting that can be copied from one connection to others on
/// the same feed.
///
/// Webhook-scoped properties are copied only when both source and target are
/// webhook-bound; `Channel` only when both are channel-bound. Everything else
/// copies unconditionally.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum CopyableProperty {
    /// Embeds attached to messages.
    Embeds,
    /// Webhook display name.
    WebhookName,
    /// Webhook avatar URL.
    WebhookIconUrl,
    /// Webhook target thread.
    WebhookThread,
    /// Placeholder truncation limits.
    PlaceholderLimits,
    /// Message text template.
    Content,
    /// Formatter: render tables.
    ContentFormatTables,
    /// Formatter: strip images.
    ContentStripImages,
    /// Formatter: disable image link previews.
    ContentDisableImageLinkPreviews,
    /// Formatter: collapse newlines.
    IgnoreNewLines,
    /// Component (button) rows.
    Components,
    /// Rich-message payload.
    RichPayload,
    /// Forum post title template.
    ForumThreadTitle,
    /// Forum post tags.
    ForumThreadTags,
    /// Placeholder fallback toggle.
    PlaceholderFallback,
    /// Article filters.
    Filters,
    /// Long-message split options.
    SplitOptions,
    /// Custom placeholders.
    CustomPlaceholders,
    /// Delivery rate limits.
    DeliveryRateLimits,
    /// Message mentions.
    MessageMentions,
    /// Bound channel (channel-bound source and target only).
    Channel,
}
