//! Core data types for the Skald feed-delivery library.
//!
//! This crate provides the domain model shared across all Skald interfaces:
//! feeds, their delivery connections, the channel/webhook destination union,
//! and the channel classification rules.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod connection;
mod copyable;
mod feed;
mod id;
mod template;

pub use channel::{ChannelKind, DiscordChannelKind, WebhookKind, classify_channel};
pub use connection::{ChannelRef, Connection, ConnectionDetails, Destination, WebhookRef};
pub use copyable::CopyableProperty;
pub use feed::Feed;
pub use id::{ConnectionId, FeedId};
pub use template::{
    ComponentButton, ComponentRow, CustomPlaceholder, CustomPlaceholderStep, DeliveryRateLimit,
    DisabledCode, Embed, EmbedField, FilterExpression, FormatterOptions, MentionTarget, Mentions,
    PlaceholderLimit, RichPayload, SplitOptions,
};
