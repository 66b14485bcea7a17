//! Error types for the Skald feed-delivery library.
//!
//! This crate provides the foundation error types used throughout the Skald
//! ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The user-facing taxonomy for connection provisioning lives in
//! [`ProvisionError`]; infrastructure failures (Discord REST transport,
//! persistence, entitlement lookups, event publishing, payload validation
//! transport) have their own families and convert into opaque
//! [`ProvisionErrorKind`] variants at the service boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod discord_api;
mod entitlement;
mod provision;
mod publish;
mod repository;
mod validator;

pub use discord_api::DiscordApiError;
pub use entitlement::EntitlementError;
pub use provision::{PayloadFieldError, ProvisionError, ProvisionErrorKind, ProvisionResult};
pub use publish::PublishError;
pub use repository::RepositoryError;
pub use validator::ValidatorError;
