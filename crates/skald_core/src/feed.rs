//! The feed aggregate root.

use crate::{Connection, ConnectionId, FeedId};
use serde::{Deserialize, Serialize};

/// A user's content feed and its delivery connections.
///
/// The feed is the aggregate root: connections live inside it and every
/// connection mutation is one conditional write against the owning feed
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Feed id.
    pub id: FeedId,
    /// Discord user id of the owner.
    pub discord_user_id: String,
    /// Ordered delivery connections.
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Opaque share-invite bookkeeping, forwarded verbatim to the event
    /// publisher when connections are deleted.
    pub share_state: Option<serde_json::Value>,
}

impl Feed {
    /// Find a connection by id.
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.id == id)
    }

    /// Count live connections delivering through the given webhook id.
    pub fn webhook_reference_count(&self, webhook_id: &str) -> usize {
        self.connections
            .iter()
            .filter(|c| {
                c.details
                    .destination
                    .webhook()
                    .is_some_and(|w| w.id == webhook_id)
            })
            .count()
    }
}
