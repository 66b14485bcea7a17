//! Channel and webhook access validation.
//!
//! Both validators translate the Discord REST client's permission and
//! existence failures into the user-facing taxonomy; anything they do not
//! recognize passes through opaque.

use derive_new::new;
use skald_core::{ChannelKind, classify_channel};
use skald_error::{DiscordApiError, ProvisionError, ProvisionErrorKind, ProvisionResult};
use skald_interface::{
    DiscordApi, DiscordChannel, DiscordWebhook, DiscordWebhookKind, GuildAuthorization,
    PermissionProbe,
};
use std::sync::Arc;
use tracing::instrument;

/// A channel that passed access validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChannel {
    /// The channel itself.
    pub channel: DiscordChannel,
    /// The parent channel, fetched when the channel is a thread.
    pub parent_channel: Option<DiscordChannel>,
    /// Classified channel type.
    pub kind: ChannelKind,
}

/// A user-owned webhook that passed access validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWebhook {
    /// The webhook itself.
    pub webhook: DiscordWebhook,
    /// The channel the webhook posts into.
    pub channel: DiscordChannel,
}

/// Verifies a channel exists and is usable, and classifies its type.
#[derive(Clone, new)]
pub struct ChannelAccessValidator {
    api: Arc<dyn DiscordApi>,
}

impl ChannelAccessValidator {
    /// Validate that the channel can be used and classify it.
    ///
    /// The probe selects relaxed (view-only) or strict (view and send)
    /// permission assertions. Threads trigger a secondary fetch of the
    /// parent channel to distinguish plain threads from forum threads.
    #[instrument(skip(self, access_token))]
    pub async fn validate(
        &self,
        access_token: &str,
        channel_id: &str,
        probe: PermissionProbe,
    ) -> ProvisionResult<ValidatedChannel> {
        let channel = self
            .api
            .can_use_channel(channel_id, access_token, probe)
            .await
            .map_err(|err| map_channel_error(err, probe))?;

        let mut parent_channel = None;

        if channel.kind.is_public_thread() {
            if let Some(parent_id) = &channel.parent_id {
                let parent = self
                    .api
                    .get_channel(parent_id)
                    .await
                    .map_err(|err| map_channel_error(err, probe))?;
                parent_channel = Some(parent);
            }
        }

        let kind = classify_channel(channel.kind, parent_channel.as_ref().map(|p| p.kind));

        Ok(ValidatedChannel {
            channel,
            parent_channel,
            kind,
        })
    }
}

fn map_channel_error(err: DiscordApiError, probe: PermissionProbe) -> ProvisionError {
    if err.is_not_found() {
        return ProvisionError::new(ProvisionErrorKind::ChannelNotFound);
    }

    if err.is_forbidden() {
        return match probe {
            PermissionProbe::ViewOnly => {
                ProvisionError::new(ProvisionErrorKind::ChannelViewPermissionMissing)
            }
            PermissionProbe::ViewAndSend => {
                ProvisionError::new(ProvisionErrorKind::ChannelSendPermissionMissing)
            }
        };
    }

    err.into()
}

/// Verifies a user-owned webhook exists, is usable, and that the caller
/// manages its guild.
#[derive(Clone, new)]
pub struct WebhookAccessValidator {
    api: Arc<dyn DiscordApi>,
    guild_authorization: Arc<dyn GuildAuthorization>,
}

impl WebhookAccessValidator {
    /// Validate that the webhook can be bound by the calling user.
    ///
    /// A forbidden response while resolving the webhook's channel is the
    /// bot's problem, not the user's, and maps to `WebhookPermissionMissing`.
    #[instrument(skip(self, access_token))]
    pub async fn validate(
        &self,
        webhook_id: &str,
        access_token: &str,
    ) -> ProvisionResult<ValidatedWebhook> {
        let webhook = self
            .api
            .get_webhook(webhook_id)
            .await
            .map_err(map_webhook_error)?
            .ok_or_else(|| {
                ProvisionError::new(ProvisionErrorKind::WebhookNotFound(webhook_id.to_string()))
            })?;

        if webhook.kind != DiscordWebhookKind::Incoming {
            return Err(ProvisionError::new(ProvisionErrorKind::InvalidWebhookType(
                webhook_id.to_string(),
            )));
        }

        let manages_guild = match &webhook.guild_id {
            Some(guild_id) => self
                .guild_authorization
                .user_manages_guild(access_token, guild_id)
                .await
                .map_err(map_webhook_error)?,
            None => false,
        };

        if !manages_guild {
            return Err(ProvisionError::new(
                ProvisionErrorKind::WebhookUserPermissionMissing(webhook_id.to_string()),
            ));
        }

        let channel = self
            .api
            .get_channel(&webhook.channel_id)
            .await
            .map_err(map_webhook_error)?;

        Ok(ValidatedWebhook { webhook, channel })
    }
}

fn map_webhook_error(err: DiscordApiError) -> ProvisionError {
    if err.is_forbidden() {
        return ProvisionError::new(ProvisionErrorKind::WebhookPermissionMissing);
    }

    err.into()
}
