//! In-memory collaborator fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use skald_connections::ConnectionProvisioningService;
use skald_core::{
    ChannelKind, ChannelRef, Connection, ConnectionId, Destination, DiscordChannelKind, Feed,
    FeedId, WebhookRef,
};
use skald_error::{
    DiscordApiError, EntitlementError, PublishError, RepositoryError, ValidatorError,
};
use skald_interface::{
    CloneConnectionsRequest, CloneFeedSelection, ConnectionCreatedEvent, ConnectionDeletedEvent,
    ConnectionEventPublisher, ConnectionPatch, CreatedConnection, DestinationPatch, DiscordApi,
    DiscordChannel, DiscordWebhook, DiscordWebhookKind, Entitlements, FeedRepository,
    GuildAuthorization, PayloadValidator, PermissionProbe, RichPayloadValidation,
};
use skald_core::{FilterExpression, RichPayload};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Feed repository
// ---------------------------------------------------------------------------

/// Feed store backed by a map, with switchable write failures.
#[derive(Default)]
pub struct InMemoryFeedRepository {
    pub feeds: Mutex<HashMap<String, Feed>>,
    pub fail_writes: AtomicBool,
    /// Selections received by `clone_connection_to_feeds`.
    pub clone_selections: Mutex<Vec<CloneFeedSelection>>,
}

impl InMemoryFeedRepository {
    pub fn insert(&self, feed: Feed) {
        self.feeds
            .lock()
            .unwrap()
            .insert(feed.id.as_str().to_string(), feed);
    }

    pub fn get(&self, feed_id: &FeedId) -> Option<Feed> {
        self.feeds.lock().unwrap().get(feed_id.as_str()).cloned()
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepositoryError::new("injected write failure"))
        } else {
            Ok(())
        }
    }
}

fn apply_patch(connection: &mut Connection, patch: ConnectionPatch) {
    if let Some(name) = patch.name {
        connection.name = name;
    }
    match patch.destination {
        Some(DestinationPatch::Channel(channel)) => {
            connection.details.destination = Destination::Channel(channel);
        }
        Some(DestinationPatch::Webhook(webhook)) => {
            connection.details.destination = Destination::Webhook(webhook);
        }
        None => {}
    }
    patch.filters.apply(&mut connection.filters);
    if let Some(payload) = patch.rich_payload {
        connection.details.rich_payload = Some(payload);
    }
    patch.split_options.apply(&mut connection.split_options);
    patch.disabled_code.apply(&mut connection.disabled_code);
    if let Some(mentions) = patch.mentions {
        connection.mentions = Some(mentions);
    }
    if let Some(rate_limits) = patch.rate_limits {
        connection.rate_limits = rate_limits;
    }
    if let Some(placeholders) = patch.custom_placeholders {
        connection.custom_placeholders = placeholders;
    }
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn find_by_id(&self, feed_id: &FeedId) -> Result<Option<Feed>, RepositoryError> {
        Ok(self.get(feed_id))
    }

    async fn append_connection(
        &self,
        feed_id: &FeedId,
        connection: Connection,
    ) -> Result<Option<Feed>, RepositoryError> {
        self.check_writable()?;
        let mut feeds = self.feeds.lock().unwrap();
        match feeds.get_mut(feed_id.as_str()) {
            Some(feed) => {
                feed.connections.push(connection);
                Ok(Some(feed.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_connection(
        &self,
        feed_id: &FeedId,
        connection_id: &ConnectionId,
        patch: ConnectionPatch,
    ) -> Result<Option<Feed>, RepositoryError> {
        self.check_writable()?;
        let mut feeds = self.feeds.lock().unwrap();
        let Some(feed) = feeds.get_mut(feed_id.as_str()) else {
            return Ok(None);
        };
        let Some(connection) = feed.connections.iter_mut().find(|c| &c.id == connection_id)
        else {
            return Ok(None);
        };
        apply_patch(connection, patch);
        Ok(Some(feed.clone()))
    }

    async fn remove_connection(
        &self,
        feed_id: &FeedId,
        connection_id: &ConnectionId,
    ) -> Result<bool, RepositoryError> {
        self.check_writable()?;
        let mut feeds = self.feeds.lock().unwrap();
        let Some(feed) = feeds.get_mut(feed_id.as_str()) else {
            return Ok(false);
        };
        let before = feed.connections.len();
        feed.connections.retain(|c| &c.id != connection_id);
        Ok(feed.connections.len() < before)
    }

    async fn replace_connections(
        &self,
        feed_id: &FeedId,
        connections: Vec<Connection>,
    ) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut feeds = self.feeds.lock().unwrap();
        match feeds.get_mut(feed_id.as_str()) {
            Some(feed) => {
                feed.connections = connections;
                Ok(())
            }
            None => Err(RepositoryError::new(format!("feed {feed_id} not found"))),
        }
    }

    async fn count_feeds_by_webhook(&self, webhook_id: &str) -> Result<u64, RepositoryError> {
        let feeds = self.feeds.lock().unwrap();
        Ok(feeds
            .values()
            .filter(|feed| feed.webhook_reference_count(webhook_id) > 0)
            .count() as u64)
    }

    async fn find_one_by_webhook(&self, webhook_id: &str) -> Result<Option<Feed>, RepositoryError> {
        let feeds = self.feeds.lock().unwrap();
        Ok(feeds
            .values()
            .find(|feed| feed.webhook_reference_count(webhook_id) > 0)
            .cloned())
    }

    async fn clone_connection_to_feeds(
        &self,
        request: CloneConnectionsRequest,
    ) -> Result<Vec<CreatedConnection>, RepositoryError> {
        self.clone_selections
            .lock()
            .unwrap()
            .push(request.selection.clone());
        self.check_writable()?;
        let mut feeds = self.feeds.lock().unwrap();

        let target_ids: Vec<String> = match &request.selection {
            CloneFeedSelection::Selected(ids) => {
                ids.iter().map(|id| id.as_str().to_string()).collect()
            }
            CloneFeedSelection::OwnedBy {
                discord_user_id, ..
            } => feeds
                .values()
                .filter(|feed| &feed.discord_user_id == discord_user_id)
                .map(|feed| feed.id.as_str().to_string())
                .collect(),
        };

        let mut created = Vec::new();
        for target in target_ids {
            if let Some(feed) = feeds.get_mut(&target) {
                let mut clone = request.connection.clone();
                clone.id = ConnectionId::generate();
                created.push(CreatedConnection {
                    feed_id: feed.id.clone(),
                    connection_id: clone.id.clone(),
                });
                feed.connections.push(clone);
            }
        }
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// Discord REST client
// ---------------------------------------------------------------------------

/// Scripted Discord API recording webhook creations and deletions.
#[derive(Default)]
pub struct RecordingDiscordApi {
    pub channels: Mutex<HashMap<String, DiscordChannel>>,
    pub webhooks: Mutex<HashMap<String, DiscordWebhook>>,
    /// Application-owned webhook ids per channel.
    pub application_webhooks: Mutex<HashMap<String, Vec<String>>>,
    pub forbidden_channels: Mutex<Vec<String>>,
    pub forbid_webhook_ops: AtomicBool,
    pub fail_webhook_delete: AtomicBool,
    pub create_webhook_calls: AtomicUsize,
    pub deleted_webhooks: Mutex<Vec<String>>,
    next_webhook: AtomicUsize,
}

impl RecordingDiscordApi {
    pub fn add_channel(&self, channel: DiscordChannel) {
        self.channels
            .lock()
            .unwrap()
            .insert(channel.id.clone(), channel);
    }

    pub fn add_webhook(&self, webhook: DiscordWebhook) {
        self.webhooks
            .lock()
            .unwrap()
            .insert(webhook.id.clone(), webhook);
    }

    /// Register an already-existing application-owned webhook on a channel.
    pub fn add_application_webhook(&self, webhook: DiscordWebhook) {
        self.application_webhooks
            .lock()
            .unwrap()
            .entry(webhook.channel_id.clone())
            .or_default()
            .push(webhook.id.clone());
        self.add_webhook(webhook);
    }

    pub fn forbid_channel(&self, channel_id: &str) {
        self.forbidden_channels
            .lock()
            .unwrap()
            .push(channel_id.to_string());
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted_webhooks.lock().unwrap().clone()
    }

    fn lookup_channel(&self, channel_id: &str) -> Result<DiscordChannel, DiscordApiError> {
        self.channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .ok_or_else(|| DiscordApiError::status(404, format!("unknown channel {channel_id}")))
    }
}

#[async_trait]
impl DiscordApi for RecordingDiscordApi {
    async fn get_channel(&self, channel_id: &str) -> Result<DiscordChannel, DiscordApiError> {
        self.lookup_channel(channel_id)
    }

    async fn can_use_channel(
        &self,
        channel_id: &str,
        _access_token: &str,
        _probe: PermissionProbe,
    ) -> Result<DiscordChannel, DiscordApiError> {
        if self
            .forbidden_channels
            .lock()
            .unwrap()
            .iter()
            .any(|c| c == channel_id)
        {
            return Err(DiscordApiError::status(403, "missing channel permissions"));
        }
        self.lookup_channel(channel_id)
    }

    async fn get_webhook(
        &self,
        webhook_id: &str,
    ) -> Result<Option<DiscordWebhook>, DiscordApiError> {
        Ok(self.webhooks.lock().unwrap().get(webhook_id).cloned())
    }

    async fn create_webhook(
        &self,
        channel_id: &str,
        name: &str,
    ) -> Result<DiscordWebhook, DiscordApiError> {
        if self.forbid_webhook_ops.load(Ordering::SeqCst) {
            return Err(DiscordApiError::status(403, "missing webhook permissions"));
        }
        self.create_webhook_calls.fetch_add(1, Ordering::SeqCst);
        let channel = self.lookup_channel(channel_id)?;
        let number = self.next_webhook.fetch_add(1, Ordering::SeqCst);
        let webhook = DiscordWebhook {
            id: format!("wh-created-{number}"),
            kind: DiscordWebhookKind::Incoming,
            token: Some(format!("token-{number}")),
            guild_id: Some(channel.guild_id.clone()),
            channel_id: channel_id.to_string(),
            name: Some(name.to_string()),
        };
        self.add_application_webhook(webhook.clone());
        Ok(webhook)
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<(), DiscordApiError> {
        self.deleted_webhooks
            .lock()
            .unwrap()
            .push(webhook_id.to_string());
        if self.fail_webhook_delete.load(Ordering::SeqCst) {
            return Err(DiscordApiError::status(500, "injected delete failure"));
        }
        match self.webhooks.lock().unwrap().remove(webhook_id) {
            Some(_) => Ok(()),
            None => Err(DiscordApiError::status(
                404,
                format!("unknown webhook {webhook_id}"),
            )),
        }
    }

    async fn channel_webhooks(
        &self,
        channel_id: &str,
        application_owned_only: bool,
    ) -> Result<Vec<DiscordWebhook>, DiscordApiError> {
        if self.forbid_webhook_ops.load(Ordering::SeqCst) {
            return Err(DiscordApiError::status(403, "missing webhook permissions"));
        }
        assert!(application_owned_only, "only application-owned listing is used");
        let ids = self
            .application_webhooks
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .unwrap_or_default();
        let webhooks = self.webhooks.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| webhooks.get(id).cloned())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Entitlements / guild authorization
// ---------------------------------------------------------------------------

pub struct StaticEntitlements {
    pub supporter: AtomicBool,
    pub fail: AtomicBool,
}

impl Default for StaticEntitlements {
    fn default() -> Self {
        Self {
            supporter: AtomicBool::new(true),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Entitlements for StaticEntitlements {
    async fn is_supporter(&self, _discord_user_id: &str) -> Result<bool, EntitlementError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EntitlementError::new("injected entitlement failure"));
        }
        Ok(self.supporter.load(Ordering::SeqCst))
    }
}

pub struct StaticGuildAuthorization {
    pub managed: AtomicBool,
}

impl Default for StaticGuildAuthorization {
    fn default() -> Self {
        Self {
            managed: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl GuildAuthorization for StaticGuildAuthorization {
    async fn user_manages_guild(
        &self,
        _access_token: &str,
        _guild_id: &str,
    ) -> Result<bool, DiscordApiError> {
        Ok(self.managed.load(Ordering::SeqCst))
    }
}

// ---------------------------------------------------------------------------
// Payload/filter validator
// ---------------------------------------------------------------------------

/// Validator fake returning scripted results; defaults to everything valid.
#[derive(Default)]
pub struct ScriptedValidator {
    pub filter_errors: Mutex<Vec<String>>,
    pub payload_result: Mutex<Option<RichPayloadValidation>>,
}

#[async_trait]
impl PayloadValidator for ScriptedValidator {
    async fn validate_rich_payload(
        &self,
        payload: &RichPayload,
    ) -> Result<RichPayloadValidation, ValidatorError> {
        Ok(self
            .payload_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| RichPayloadValidation::Valid {
                sanitized: payload.clone(),
            }))
    }

    async fn validate_filter_expression(
        &self,
        _expression: &FilterExpression,
    ) -> Result<Vec<String>, ValidatorError> {
        Ok(self.filter_errors.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Event publisher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingPublisher {
    pub created: Mutex<Vec<ConnectionCreatedEvent>>,
    pub deleted: Mutex<Vec<ConnectionDeletedEvent>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ConnectionEventPublisher for RecordingPublisher {
    async fn notify_created(&self, events: &[ConnectionCreatedEvent]) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::new("injected publish failure"));
        }
        self.created.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn notify_deleted(&self, event: &ConnectionDeletedEvent) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::new("injected publish failure"));
        }
        self.deleted.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness and fixtures
// ---------------------------------------------------------------------------

pub struct Harness {
    pub repository: Arc<InMemoryFeedRepository>,
    pub discord: Arc<RecordingDiscordApi>,
    pub entitlements: Arc<StaticEntitlements>,
    pub guilds: Arc<StaticGuildAuthorization>,
    pub validator: Arc<ScriptedValidator>,
    pub publisher: Arc<RecordingPublisher>,
    pub service: ConnectionProvisioningService,
}

impl Harness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryFeedRepository::default());
        let discord = Arc::new(RecordingDiscordApi::default());
        let entitlements = Arc::new(StaticEntitlements::default());
        let guilds = Arc::new(StaticGuildAuthorization::default());
        let validator = Arc::new(ScriptedValidator::default());
        let publisher = Arc::new(RecordingPublisher::default());

        let service = ConnectionProvisioningService::new(
            Arc::clone(&repository) as Arc<dyn FeedRepository>,
            Arc::clone(&discord) as Arc<dyn DiscordApi>,
            Arc::clone(&entitlements) as Arc<dyn Entitlements>,
            Arc::clone(&guilds) as Arc<dyn GuildAuthorization>,
            Arc::clone(&validator) as Arc<dyn PayloadValidator>,
            Arc::clone(&publisher) as Arc<dyn ConnectionEventPublisher>,
        );

        Self {
            repository,
            discord,
            entitlements,
            guilds,
            validator,
            publisher,
            service,
        }
    }
}

pub fn feed(id: &str, owner: &str) -> Feed {
    Feed {
        id: FeedId::new(id),
        discord_user_id: owner.to_string(),
        connections: Vec::new(),
        share_state: None,
    }
}

pub fn text_channel(id: &str, guild_id: &str) -> DiscordChannel {
    DiscordChannel {
        id: id.to_string(),
        guild_id: guild_id.to_string(),
        kind: DiscordChannelKind::GuildText,
        parent_id: None,
    }
}

pub fn forum_channel(id: &str, guild_id: &str) -> DiscordChannel {
    DiscordChannel {
        id: id.to_string(),
        guild_id: guild_id.to_string(),
        kind: DiscordChannelKind::GuildForum,
        parent_id: None,
    }
}

pub fn thread_channel(id: &str, guild_id: &str, parent_id: &str) -> DiscordChannel {
    DiscordChannel {
        id: id.to_string(),
        guild_id: guild_id.to_string(),
        kind: DiscordChannelKind::PublicThread,
        parent_id: Some(parent_id.to_string()),
    }
}

pub fn incoming_webhook(id: &str, guild_id: &str, channel_id: &str) -> DiscordWebhook {
    DiscordWebhook {
        id: id.to_string(),
        kind: DiscordWebhookKind::Incoming,
        token: Some(format!("{id}-token")),
        guild_id: Some(guild_id.to_string()),
        channel_id: channel_id.to_string(),
        name: Some("hook".to_string()),
    }
}

/// A connection already bound to an application-owned webhook.
pub fn application_webhook_connection(
    connection_id: &str,
    webhook_id: &str,
    guild_id: &str,
    channel_id: &str,
) -> Connection {
    Connection::bound(
        ConnectionId::new(connection_id),
        "bound",
        Destination::Webhook(WebhookRef {
            id: webhook_id.to_string(),
            token: format!("{webhook_id}-token"),
            guild_id: guild_id.to_string(),
            channel_id: channel_id.to_string(),
            name: None,
            icon_url: None,
            thread_id: None,
            kind: None,
            is_application_owned: true,
        }),
    )
}

/// A connection bound to a plain channel.
pub fn channel_connection(connection_id: &str, channel_id: &str, guild_id: &str) -> Connection {
    Connection::bound(
        ConnectionId::new(connection_id),
        "bound",
        Destination::Channel(ChannelRef {
            id: channel_id.to_string(),
            guild_id: guild_id.to_string(),
            kind: ChannelKind::Standard,
            parent_channel_id: None,
        }),
    )
}
