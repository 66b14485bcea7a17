//! Discord connection provisioning for Skald feeds.
//!
//! This crate binds a feed to its Discord delivery destination: a channel or
//! a webhook, including webhooks the application creates and must
//! garbage-collect.
//!
//! # Architecture
//!
//! Leaf components first:
//! - **validator**: channel and webhook access validation against the Discord
//!   REST boundary
//! - **provisioner**: idempotent get-or-create of application-owned webhooks
//! - **cleanup**: reference-counted deletion of orphaned application webhooks
//!
//! On top of them, [`ConnectionProvisioningService`] orchestrates
//! create/update/delete/clone/copy-settings and owns all compensation logic:
//! validation runs before the single conditional write of each mutation, and
//! a webhook freshly provisioned during a failed mutation is cleaned up
//! best-effort before the original error propagates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cleanup;
mod input;
mod provisioner;
mod service;
mod validator;

pub use cleanup::WebhookCleanupCoordinator;
pub use input::{
    CloneConnectionInput, CloneTarget, ConnectionTarget, CopySettingsInput, CreateConnectionInput,
    ThreadCreationMethod, UpdateConnectionInput, UpdateConnectionRequest,
};
pub use provisioner::ApplicationWebhookProvisioner;
pub use service::ConnectionProvisioningService;
pub use validator::{
    ChannelAccessValidator, ValidatedChannel, ValidatedWebhook, WebhookAccessValidator,
};
