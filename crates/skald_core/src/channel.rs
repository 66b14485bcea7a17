//! Channel classification.
//!
//! Discord reports a raw numeric channel type; connections store a
//! *classified* type that additionally folds in the parent channel for
//! threads. Classification is a pure decision table over
//! `(channel.type, parent?.type)`.

use serde::{Deserialize, Serialize};

/// Raw Discord channel types, by wire discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscordChannelKind {
    /// Plain guild text channel (type 0).
    GuildText,
    /// Announcement channel (type 5).
    GuildAnnouncement,
    /// Thread under an announcement channel (type 10).
    AnnouncementThread,
    /// Public thread under a text or forum channel (type 11).
    PublicThread,
    /// Private thread (type 12).
    PrivateThread,
    /// Forum channel (type 15).
    GuildForum,
    /// Media channel (type 16).
    GuildMedia,
    /// Any other channel type the bot does not specialize on.
    Other(u8),
}

impl DiscordChannelKind {
    /// Decode a raw wire discriminant.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::GuildText,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            15 => Self::GuildForum,
            16 => Self::GuildMedia,
            other => Self::Other(other),
        }
    }

    /// Whether this raw type is a thread that may carry a forum parent.
    pub fn is_public_thread(&self) -> bool {
        matches!(self, Self::PublicThread | Self::AnnouncementThread)
    }
}

/// Classified channel type stored on a channel-bound connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    /// Plain channel the bot posts into directly.
    Standard,
    /// Thread whose parent is a non-forum channel.
    Thread,
    /// Thread whose parent is a forum.
    ForumThread,
    /// Forum channel; each article opens a forum post.
    Forum,
    /// Plain channel where each article opens a new thread.
    NewThread,
}

/// Classified webhook delivery type stored on a webhook-bound connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WebhookKind {
    /// Webhook posting into a thread.
    Thread,
    /// Webhook posting into a thread under a forum.
    ForumThread,
    /// Webhook posting into a forum channel.
    Forum,
}

/// Classify a channel from its raw type and, for threads, its parent's raw
/// type.
///
/// # Examples
///
/// ```
/// use skald_core::{ChannelKind, DiscordChannelKind, classify_channel};
///
/// let kind = classify_channel(
///     DiscordChannelKind::PublicThread,
///     Some(DiscordChannelKind::GuildForum),
/// );
/// assert_eq!(kind, ChannelKind::ForumThread);
/// ```
pub fn classify_channel(raw: DiscordChannelKind, parent: Option<DiscordChannelKind>) -> ChannelKind {
    match (raw, parent) {
        (DiscordChannelKind::GuildForum, _) => ChannelKind::Forum,
        (r, Some(DiscordChannelKind::GuildForum)) if r.is_public_thread() => ChannelKind::ForumThread,
        (r, _) if r.is_public_thread() => ChannelKind::Thread,
        _ => ChannelKind::Standard,
    }
}
