//! Trait definitions for the Skald feed-delivery library.
//!
//! This crate specifies the boundary of every collaborator the connection
//! provisioning service consumes: the feed repository, the Discord REST
//! client, entitlements, guild authorization, the payload/filter validator
//! and the connection event publisher. Implementations live elsewhere; the
//! provisioning crate depends only on these contracts.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{
    ConnectionEventPublisher, DiscordApi, Entitlements, FeedRepository, GuildAuthorization,
    PayloadValidator,
};
pub use types::{
    CloneConnectionsRequest, CloneFeedSelection, ConnectionCreatedEvent, ConnectionDeletedEvent,
    ConnectionPatch, CreatedConnection, DestinationPatch, DiscordChannel, DiscordWebhook,
    DiscordWebhookKind, PatchField, PermissionProbe, RichPayloadValidation,
};
