//! Connection provisioning orchestration.

use crate::{
    ApplicationWebhookProvisioner, ChannelAccessValidator, CloneConnectionInput, CloneTarget,
    ConnectionTarget, CopySettingsInput, CreateConnectionInput, ThreadCreationMethod,
    UpdateConnectionRequest, WebhookAccessValidator, WebhookCleanupCoordinator,
};
use skald_core::{
    ChannelKind, ChannelRef, Connection, ConnectionId, CopyableProperty, Destination,
    DiscordChannelKind, Feed, FeedId, RichPayload, WebhookKind, WebhookRef,
};
use skald_error::{ProvisionError, ProvisionErrorKind, ProvisionResult};
use skald_interface::{
    CloneConnectionsRequest, CloneFeedSelection, ConnectionCreatedEvent, ConnectionDeletedEvent,
    ConnectionEventPublisher, ConnectionPatch, CreatedConnection, DestinationPatch, DiscordApi,
    DiscordChannel, DiscordWebhook, Entitlements, FeedRepository, GuildAuthorization, PatchField,
    PayloadValidator, PermissionProbe, RichPayloadValidation,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, instrument};

/// Name given to application webhooks provisioned for clones, where no single
/// owning connection id exists yet.
const MANAGED_CLONE_WEBHOOK_NAME: &str = "skald-managed-connection";

fn application_webhook_name(feed_id: &FeedId, connection_id: &ConnectionId) -> String {
    format!("feed-{feed_id}-{connection_id}")
}

/// Provisions, mutates, clones and retires the binding between a feed and its
/// Discord delivery destination.
///
/// All validation runs before the single conditional write of each mutation;
/// compensation (cleanup of a webhook provisioned earlier in the same call)
/// runs only after that write has failed and never masks the original error.
pub struct ConnectionProvisioningService {
    repository: Arc<dyn FeedRepository>,
    entitlements: Arc<dyn Entitlements>,
    payload_validator: Arc<dyn PayloadValidator>,
    events: Arc<dyn ConnectionEventPublisher>,
    channels: ChannelAccessValidator,
    webhooks: WebhookAccessValidator,
    provisioner: ApplicationWebhookProvisioner,
    cleanup: WebhookCleanupCoordinator,
}

impl ConnectionProvisioningService {
    /// Wire the service and its leaf components to their collaborators.
    pub fn new(
        repository: Arc<dyn FeedRepository>,
        discord: Arc<dyn DiscordApi>,
        entitlements: Arc<dyn Entitlements>,
        guild_authorization: Arc<dyn GuildAuthorization>,
        payload_validator: Arc<dyn PayloadValidator>,
        events: Arc<dyn ConnectionEventPublisher>,
    ) -> Self {
        Self {
            channels: ChannelAccessValidator::new(Arc::clone(&discord)),
            webhooks: WebhookAccessValidator::new(Arc::clone(&discord), guild_authorization),
            provisioner: ApplicationWebhookProvisioner::new(Arc::clone(&discord)),
            cleanup: WebhookCleanupCoordinator::new(Arc::clone(&repository), discord),
            repository,
            entitlements,
            payload_validator,
            events,
        }
    }

    /// The coordinator used for orphaned-webhook cleanup.
    ///
    /// Direct callers see remote-delete failures; the service itself only
    /// ever invokes it best-effort.
    pub fn cleanup_coordinator(&self) -> &WebhookCleanupCoordinator {
        &self.cleanup
    }

    /// Create a connection on the feed and bind it to the requested
    /// destination.
    #[instrument(skip(self, input), fields(feed_id = %feed.id))]
    pub async fn create(
        &self,
        feed: &Feed,
        input: CreateConnectionInput,
    ) -> ProvisionResult<Connection> {
        let connection_id = ConnectionId::generate();
        let mut provisioned_webhook_id = None;

        let destination = match &input.target {
            ConnectionTarget::Channel {
                channel_id,
                thread_creation,
            } => Destination::Channel(
                self.resolve_channel(
                    &input.access_token,
                    channel_id,
                    *thread_creation,
                    PermissionProbe::ViewAndSend,
                )
                .await?,
            ),
            ConnectionTarget::UserWebhook {
                webhook_id,
                name,
                icon_url,
                thread_id,
            } => {
                self.require_supporter(&feed.discord_user_id).await?;
                let validated = self.webhooks.validate(webhook_id, &input.access_token).await?;
                let webhook_ref = self
                    .build_webhook_ref(
                        &input.access_token,
                        validated.webhook,
                        &validated.channel,
                        name.clone(),
                        icon_url.clone(),
                        thread_id.clone(),
                        false,
                    )
                    .await?;
                Destination::Webhook(webhook_ref)
            }
            ConnectionTarget::ApplicationWebhook {
                channel_id,
                name,
                icon_url,
                thread_id,
            } => {
                self.require_supporter(&feed.discord_user_id).await?;
                let validated = self
                    .channels
                    .validate(&input.access_token, channel_id, PermissionProbe::ViewOnly)
                    .await?;
                let webhook = self
                    .provisioner
                    .get_or_create(
                        &validated.channel.id,
                        &application_webhook_name(&feed.id, &connection_id),
                    )
                    .await?;
                provisioned_webhook_id = Some(webhook.id.clone());
                let webhook_ref = self
                    .build_webhook_ref(
                        &input.access_token,
                        webhook,
                        &validated.channel,
                        name.clone(),
                        icon_url.clone(),
                        thread_id.clone(),
                        true,
                    )
                    .await?;
                Destination::Webhook(webhook_ref)
            }
        };

        let rich_payload = match &input.rich_payload {
            Some(payload) => Some(self.sanitize_rich_payload(payload).await?),
            None => None,
        };

        let mut connection = Connection::bound(connection_id.clone(), &input.name, destination);
        connection.details.embeds = input.embeds.clone();
        connection.details.content = input.content.clone();
        connection.details.rich_payload = rich_payload;

        let created = self
            .attempt_with_compensation(
                async {
                    let feed_after = self
                        .repository
                        .append_connection(&feed.id, connection)
                        .await?
                        .ok_or_else(|| {
                            ProvisionError::internal(format!(
                                "feed {} not found during connection insert",
                                feed.id
                            ))
                        })?;

                    feed_after.connection(&connection_id).cloned().ok_or_else(|| {
                        ProvisionError::internal(format!(
                            "connection {connection_id} missing from feed {} after insert",
                            feed.id
                        ))
                    })
                },
                provisioned_webhook_id.as_deref(),
            )
            .await?;

        let event = ConnectionCreatedEvent {
            feed_id: feed.id.clone(),
            connection_id: created.id.clone(),
            actor_discord_user_id: input.actor_discord_user_id.clone(),
        };

        if let Err(err) = self.events.notify_created(std::slice::from_ref(&event)).await {
            error!(feed_id = %feed.id, connection_id = %created.id, %err,
                "failed to publish connection creation");
        }

        Ok(created)
    }

    /// Apply field updates to an existing connection.
    ///
    /// The caller is expected to have already fetched the connection; a
    /// conditional update that matches nothing is an invariant violation,
    /// not a user-facing not-found.
    #[instrument(skip(self, request), fields(feed_id = %feed_id, connection_id = %connection_id))]
    pub async fn update(
        &self,
        feed_id: &FeedId,
        connection_id: &ConnectionId,
        request: UpdateConnectionRequest,
    ) -> ProvisionResult<Connection> {
        let UpdateConnectionRequest {
            access_token,
            feed,
            old_connection,
            updates,
        } = request;

        let mut patch = ConnectionPatch::default();
        let mut provisioned_webhook_id: Option<String> = None;

        match &updates.target {
            Some(ConnectionTarget::Channel {
                channel_id,
                thread_creation,
            }) => {
                let channel_ref = self
                    .resolve_channel(
                        &access_token,
                        channel_id,
                        *thread_creation,
                        PermissionProbe::ViewAndSend,
                    )
                    .await?;
                patch.destination = Some(DestinationPatch::Channel(channel_ref));
            }
            Some(ConnectionTarget::UserWebhook {
                webhook_id,
                name,
                icon_url,
                thread_id,
            }) => {
                self.require_supporter(&feed.discord_user_id).await?;
                let validated = self.webhooks.validate(webhook_id, &access_token).await?;
                let webhook_ref = self
                    .build_webhook_ref(
                        &access_token,
                        validated.webhook,
                        &validated.channel,
                        name.clone(),
                        icon_url.clone(),
                        thread_id.clone(),
                        false,
                    )
                    .await?;
                patch.destination = Some(DestinationPatch::Webhook(webhook_ref));
            }
            Some(ConnectionTarget::ApplicationWebhook {
                channel_id,
                name,
                icon_url,
                thread_id,
            }) => {
                self.require_supporter(&feed.discord_user_id).await?;
                let validated = self
                    .channels
                    .validate(&access_token, channel_id, PermissionProbe::ViewOnly)
                    .await?;
                let webhook = self
                    .provisioner
                    .get_or_create(
                        &validated.channel.id,
                        &application_webhook_name(feed_id, connection_id),
                    )
                    .await?;
                provisioned_webhook_id = Some(webhook.id.clone());
                let webhook_ref = self
                    .build_webhook_ref(
                        &access_token,
                        webhook,
                        &validated.channel,
                        name.clone(),
                        icon_url.clone(),
                        thread_id.clone(),
                        true,
                    )
                    .await?;
                patch.destination = Some(DestinationPatch::Webhook(webhook_ref));
            }
            None => {}
        }

        if let PatchField::Set(expression) = &updates.filters {
            let errors = self
                .payload_validator
                .validate_filter_expression(expression)
                .await?;

            if !errors.is_empty() {
                return Err(ProvisionError::new(
                    ProvisionErrorKind::InvalidFilterExpression(errors),
                ));
            }
        }

        if let Some(payload) = &updates.rich_payload {
            patch.rich_payload = Some(self.sanitize_rich_payload(payload).await?);
        }

        if let Some(placeholders) = &updates.custom_placeholders {
            for placeholder in placeholders {
                if placeholder.steps.iter().any(|step| step.is_bare_id()) {
                    return Err(ProvisionError::internal(format!(
                        "custom placeholder {} has a step carrying only an id",
                        placeholder.id
                    )));
                }
            }
            patch.custom_placeholders = Some(placeholders.clone());
        }

        patch.name = updates.name.clone();
        patch.filters = updates.filters.clone();
        patch.split_options = updates.split_options.clone();
        patch.disabled_code = updates.disabled_code.clone();
        patch.mentions = updates.mentions.clone();
        patch.rate_limits = updates.rate_limits.clone();

        // Decide now whether this update vacates an application-owned
        // webhook; the patch is consumed by the write below.
        let vacated_webhook_id = match (&patch.destination, old_connection.details.destination.webhook())
        {
            (Some(DestinationPatch::Channel(_)), Some(old)) if old.is_application_owned => {
                Some(old.id.clone())
            }
            (Some(DestinationPatch::Webhook(new)), Some(old))
                if old.is_application_owned && new.id != old.id =>
            {
                Some(old.id.clone())
            }
            _ => None,
        };

        let updated = self
            .attempt_with_compensation(
                async {
                    let feed_after = self
                        .repository
                        .update_connection(feed_id, connection_id, patch)
                        .await?
                        .ok_or_else(|| {
                            ProvisionError::internal(format!(
                                "connection {connection_id} not matched on feed {feed_id} during update"
                            ))
                        })?;

                    feed_after.connection(connection_id).cloned().ok_or_else(|| {
                        ProvisionError::internal(format!(
                            "connection {connection_id} missing from feed {feed_id} after update"
                        ))
                    })
                },
                provisioned_webhook_id.as_deref(),
            )
            .await?;

        if let Some(webhook_id) = vacated_webhook_id {
            self.discard_webhook(&webhook_id).await;
        }

        Ok(updated)
    }

    /// Remove a connection from its feed.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        feed_id: &FeedId,
        connection_id: &ConnectionId,
    ) -> ProvisionResult<()> {
        let feed = self.repository.find_by_id(feed_id).await?.ok_or_else(|| {
            ProvisionError::new(ProvisionErrorKind::ConnectionNotFound(format!(
                "feed {feed_id} not found"
            )))
        })?;

        let connection = feed.connection(connection_id).cloned().ok_or_else(|| {
            ProvisionError::new(ProvisionErrorKind::ConnectionNotFound(format!(
                "connection {connection_id} not found in feed {feed_id}"
            )))
        })?;

        let removed = self.repository.remove_connection(feed_id, connection_id).await?;

        if !removed {
            return Err(ProvisionError::internal(format!(
                "failed to remove connection {connection_id} from feed {feed_id}"
            )));
        }

        let event = ConnectionDeletedEvent {
            feed_id: feed_id.clone(),
            deleted_connection_ids: vec![connection_id.clone()],
            share_state: feed.share_state.clone(),
        };

        if let Err(err) = self.events.notify_deleted(&event).await {
            error!(%feed_id, %connection_id, %err, "failed to publish connection deletion");
        }

        if let Some(webhook) = connection.details.destination.webhook() {
            if webhook.is_application_owned {
                self.discard_webhook(&webhook.id).await;
            }
        }

        Ok(())
    }

    /// Clone a connection into one or many feeds.
    ///
    /// When the source delivers through an application-owned webhook, exactly
    /// one new webhook is provisioned up front and shared by every clone.
    #[instrument(skip(self, connection, input, access_token), fields(connection_id = %connection.id))]
    pub async fn clone_connection(
        &self,
        connection: &Connection,
        input: CloneConnectionInput,
        access_token: &str,
        actor_discord_user_id: &str,
    ) -> ProvisionResult<Vec<CreatedConnection>> {
        let mut template = connection.clone();
        template.name = input.name.clone();

        if let Some(channel_id) = &input.channel_id {
            let probe = if connection.details.destination.webhook().is_some() {
                PermissionProbe::ViewOnly
            } else {
                PermissionProbe::ViewAndSend
            };

            let channel_ref = self
                .resolve_channel(access_token, channel_id, None, probe)
                .await?;

            if matches!(template.details.destination, Destination::Channel(_)) {
                template.details.destination = Destination::Channel(channel_ref);
            }
        }

        let mut provisioned_webhook_id = None;

        if let Some(webhook) = connection.details.destination.webhook() {
            if webhook.is_application_owned {
                let fresh = self
                    .provisioner
                    .get_or_create(&webhook.channel_id, MANAGED_CLONE_WEBHOOK_NAME)
                    .await?;
                let token = fresh.token.clone().ok_or_else(|| {
                    ProvisionError::internal(format!(
                        "webhook {} exposes no delivery token",
                        fresh.id
                    ))
                })?;

                provisioned_webhook_id = Some(fresh.id.clone());

                if let Some(target) = template.details.destination.webhook_mut() {
                    target.id = fresh.id;
                    target.token = token;
                }
            }
        }

        let selection = match input.target {
            CloneTarget::SelectedFeeds(feed_ids) => CloneFeedSelection::Selected(feed_ids),
            CloneTarget::OwnedFeeds { search } => CloneFeedSelection::OwnedBy {
                discord_user_id: actor_discord_user_id.to_string(),
                search,
            },
        };

        let created = self
            .attempt_with_compensation(
                async {
                    self.repository
                        .clone_connection_to_feeds(CloneConnectionsRequest {
                            selection,
                            connection: template,
                        })
                        .await
                        .map_err(ProvisionError::from)
                },
                provisioned_webhook_id.as_deref(),
            )
            .await?;

        if !created.is_empty() {
            let events: Vec<ConnectionCreatedEvent> = created
                .iter()
                .map(|pair| ConnectionCreatedEvent {
                    feed_id: pair.feed_id.clone(),
                    connection_id: pair.connection_id.clone(),
                    actor_discord_user_id: actor_discord_user_id.to_string(),
                })
                .collect();

            if let Err(err) = self.events.notify_created(&events).await {
                error!(%err, "failed to publish clone creations");
            }
        }

        Ok(created)
    }

    /// Copy whitelisted settings from one connection to others on the same
    /// feed.
    ///
    /// Webhook-scoped settings are copied only when both sides are
    /// webhook-bound; the channel only when both sides are channel-bound.
    /// The rewritten connection list is persisted in one call.
    #[instrument(skip(self, source, input), fields(feed_id = %feed.id, source_id = %source.id))]
    pub async fn copy_settings(
        &self,
        feed: &Feed,
        source: &Connection,
        input: CopySettingsInput,
    ) -> ProvisionResult<()> {
        let current = self.repository.find_by_id(&feed.id).await?.ok_or_else(|| {
            ProvisionError::internal(format!("feed {} not found for settings copy", feed.id))
        })?;

        let mut connections = current.connections;

        // Resolve every target before mutating anything.
        let mut target_indices = Vec::with_capacity(input.target_connection_ids.len());
        for id in &input.target_connection_ids {
            let index = connections
                .iter()
                .position(|c| &c.id == id)
                .ok_or_else(|| {
                    ProvisionError::new(ProvisionErrorKind::ConnectionNotFound(format!(
                        "connection {id} not found on feed {}",
                        feed.id
                    )))
                })?;
            target_indices.push(index);
        }

        for index in target_indices {
            for property in &input.properties {
                copy_property(source, &mut connections[index], *property);
            }
        }

        self.repository.replace_connections(&feed.id, connections).await?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared resolution steps
    // ------------------------------------------------------------------

    async fn resolve_channel(
        &self,
        access_token: &str,
        channel_id: &str,
        thread_creation: Option<ThreadCreationMethod>,
        probe: PermissionProbe,
    ) -> ProvisionResult<ChannelRef> {
        let validated = self.channels.validate(access_token, channel_id, probe).await?;

        let kind = match thread_creation {
            Some(ThreadCreationMethod::NewThread) => ChannelKind::NewThread,
            None => validated.kind,
        };

        Ok(ChannelRef {
            id: validated.channel.id,
            guild_id: validated.channel.guild_id,
            kind,
            parent_channel_id: validated.parent_channel.map(|p| p.id),
        })
    }

    /// Assemble the webhook branch of a destination, re-validating the
    /// attached thread and tagging forum channels.
    #[allow(clippy::too_many_arguments)]
    async fn build_webhook_ref(
        &self,
        access_token: &str,
        webhook: DiscordWebhook,
        channel: &DiscordChannel,
        name: Option<String>,
        icon_url: Option<String>,
        thread_id: Option<String>,
        is_application_owned: bool,
    ) -> ProvisionResult<WebhookRef> {
        let kind = match &thread_id {
            Some(thread_id) => {
                let validated = self
                    .channels
                    .validate(access_token, thread_id, PermissionProbe::ViewOnly)
                    .await?;

                match validated.kind {
                    ChannelKind::Thread => Some(WebhookKind::Thread),
                    ChannelKind::ForumThread => Some(WebhookKind::ForumThread),
                    _ => {
                        return Err(ProvisionError::new(ProvisionErrorKind::InvalidChannelType));
                    }
                }
            }
            None if channel.kind == DiscordChannelKind::GuildForum => Some(WebhookKind::Forum),
            None => None,
        };

        let webhook_id = webhook.id;
        let token = webhook.token.ok_or_else(|| {
            ProvisionError::internal(format!("webhook {webhook_id} exposes no delivery token"))
        })?;

        Ok(WebhookRef {
            id: webhook_id,
            token,
            guild_id: channel.guild_id.clone(),
            channel_id: channel.id.clone(),
            name,
            icon_url,
            thread_id,
            kind,
            is_application_owned,
        })
    }

    async fn require_supporter(&self, discord_user_id: &str) -> ProvisionResult<()> {
        if self.entitlements.is_supporter(discord_user_id).await? {
            Ok(())
        } else {
            Err(ProvisionError::new(
                ProvisionErrorKind::InsufficientEntitlement,
            ))
        }
    }

    async fn sanitize_rich_payload(&self, payload: &RichPayload) -> ProvisionResult<RichPayload> {
        match self.payload_validator.validate_rich_payload(payload).await? {
            RichPayloadValidation::Valid { sanitized } => Ok(sanitized),
            RichPayloadValidation::Invalid { errors } => Err(ProvisionError::new(
                ProvisionErrorKind::InvalidRichPayload(errors),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Compensation
    // ------------------------------------------------------------------

    /// Run the mutating step of an operation; when it fails and a webhook was
    /// provisioned earlier in the same call, clean that webhook up
    /// best-effort before returning the original error.
    async fn attempt_with_compensation<T>(
        &self,
        action: impl Future<Output = ProvisionResult<T>>,
        provisioned_webhook_id: Option<&str>,
    ) -> ProvisionResult<T> {
        match action.await {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Some(webhook_id) = provisioned_webhook_id {
                    self.discard_webhook(webhook_id).await;
                }
                Err(err)
            }
        }
    }

    /// Best-effort webhook cleanup; failures are logged, never surfaced.
    async fn discard_webhook(&self, webhook_id: &str) {
        if let Err(err) = self.cleanup.cleanup(webhook_id).await {
            error!(webhook_id, %err, "best-effort webhook cleanup failed");
        }
    }
}

/// Copy a single whitelisted setting from `source` into `target`.
fn copy_property(source: &Connection, target: &mut Connection, property: CopyableProperty) {
    match property {
        CopyableProperty::Embeds => {
            target.details.embeds = source.details.embeds.clone();
        }
        CopyableProperty::WebhookName => {
            if let (Some(src), Some(dst)) = (
                source.details.destination.webhook(),
                target.details.destination.webhook_mut(),
            ) {
                dst.name = src.name.clone();
            }
        }
        CopyableProperty::WebhookIconUrl => {
            if let (Some(src), Some(dst)) = (
                source.details.destination.webhook(),
                target.details.destination.webhook_mut(),
            ) {
                dst.icon_url = src.icon_url.clone();
            }
        }
        CopyableProperty::WebhookThread => {
            if let (Some(src), Some(dst)) = (
                source.details.destination.webhook(),
                target.details.destination.webhook_mut(),
            ) {
                dst.thread_id = src.thread_id.clone();
            }
        }
        CopyableProperty::PlaceholderLimits => {
            target.details.placeholder_limits = source.details.placeholder_limits.clone();
        }
        CopyableProperty::Content => {
            target.details.content = source.details.content.clone();
        }
        CopyableProperty::ContentFormatTables => {
            target.details.formatter.format_tables = source.details.formatter.format_tables;
        }
        CopyableProperty::ContentStripImages => {
            target.details.formatter.strip_images = source.details.formatter.strip_images;
        }
        CopyableProperty::ContentDisableImageLinkPreviews => {
            target.details.formatter.disable_image_link_previews =
                source.details.formatter.disable_image_link_previews;
        }
        CopyableProperty::IgnoreNewLines => {
            target.details.formatter.ignore_new_lines = source.details.formatter.ignore_new_lines;
        }
        CopyableProperty::Components => {
            target.details.component_rows = source.details.component_rows.clone();
        }
        CopyableProperty::RichPayload => {
            target.details.rich_payload = source.details.rich_payload.clone();
        }
        CopyableProperty::ForumThreadTitle => {
            target.details.forum_thread_title = source.details.forum_thread_title.clone();
        }
        CopyableProperty::ForumThreadTags => {
            target.details.forum_thread_tags = source.details.forum_thread_tags.clone();
        }
        CopyableProperty::PlaceholderFallback => {
            target.details.enable_placeholder_fallback =
                source.details.enable_placeholder_fallback;
        }
        CopyableProperty::Filters => {
            target.filters = source.filters.clone();
        }
        CopyableProperty::SplitOptions => {
            target.split_options = source.split_options.clone();
        }
        CopyableProperty::CustomPlaceholders => {
            target.custom_placeholders = source.custom_placeholders.clone();
        }
        CopyableProperty::DeliveryRateLimits => {
            target.rate_limits = source.rate_limits.clone();
        }
        CopyableProperty::MessageMentions => {
            target.mentions = source.mentions.clone();
        }
        CopyableProperty::Channel => {
            if let (Some(src), Destination::Channel(dst)) = (
                source.details.destination.channel(),
                &mut target.details.destination,
            ) {
                *dst = src.clone();
            }
        }
    }
}
