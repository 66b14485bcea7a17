//! Reference-counted cleanup of application-owned webhooks.

use derive_new::new;
use skald_error::ProvisionResult;
use skald_interface::{DiscordApi, FeedRepository};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Deletes an application-owned webhook remotely once no feed references it.
///
/// The count is re-derived from the repository on every call, so two
/// concurrent deletes of sibling connections can both observe a stale count.
/// The delete itself is idempotent: a 404 from the remote API is treated as
/// success.
#[derive(Clone, new)]
pub struct WebhookCleanupCoordinator {
    repository: Arc<dyn FeedRepository>,
    api: Arc<dyn DiscordApi>,
}

impl WebhookCleanupCoordinator {
    /// Delete the webhook remotely if no live connection references it.
    ///
    /// Remote-delete failures propagate to the caller; callers running
    /// cleanup as a side effect of another operation are expected to log and
    /// swallow them.
    #[instrument(skip(self))]
    pub async fn cleanup(&self, webhook_id: &str) -> ProvisionResult<()> {
        let feed_use_count = self.repository.count_feeds_by_webhook(webhook_id).await?;

        if feed_use_count == 0 {
            return self.delete_remote(webhook_id).await;
        }

        if feed_use_count > 1 {
            debug!(webhook_id, feed_use_count, "webhook still shared, skipping cleanup");
            return Ok(());
        }

        // One feed still claims the webhook; re-fetch it and count live
        // connection references before trusting the stale count.
        let Some(feed) = self.repository.find_one_by_webhook(webhook_id).await? else {
            return Ok(());
        };

        if feed.webhook_reference_count(webhook_id) == 0 {
            return self.delete_remote(webhook_id).await;
        }

        Ok(())
    }

    async fn delete_remote(&self, webhook_id: &str) -> ProvisionResult<()> {
        match self.api.delete_webhook(webhook_id).await {
            Ok(()) => Ok(()),
            // Already gone; a concurrent cleanup won the race.
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
