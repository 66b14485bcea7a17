//! Idempotent provisioning of application-owned webhooks.

use derive_new::new;
use skald_error::{DiscordApiError, ProvisionError, ProvisionErrorKind, ProvisionResult};
use skald_interface::{DiscordApi, DiscordWebhook};
use std::sync::Arc;
use tracing::instrument;

/// Gets or creates the application-owned webhook of a channel.
///
/// A channel holds at most one application-owned webhook: repeated calls
/// against an already-provisioned channel return the existing webhook and
/// never create a second one, which bounds orphan creation under retried
/// requests.
#[derive(Clone, new)]
pub struct ApplicationWebhookProvisioner {
    api: Arc<dyn DiscordApi>,
}

impl ApplicationWebhookProvisioner {
    /// Return the channel's existing application-owned webhook, or create
    /// one with the given name.
    ///
    /// Selection is deterministic: the first listed webhook wins.
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        channel_id: &str,
        name: &str,
    ) -> ProvisionResult<DiscordWebhook> {
        let existing = self
            .api
            .channel_webhooks(channel_id, true)
            .await
            .map_err(map_provision_error)?;

        if let Some(webhook) = existing.into_iter().next() {
            return Ok(webhook);
        }

        self.api
            .create_webhook(channel_id, name)
            .await
            .map_err(map_provision_error)
    }
}

fn map_provision_error(err: DiscordApiError) -> ProvisionError {
    if err.is_forbidden() {
        return ProvisionError::new(ProvisionErrorKind::WebhookPermissionMissing);
    }

    err.into()
}
