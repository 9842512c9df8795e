//! Atelier Core Library
//!
//! This crate provides the core functionality for Atelier, a studio
//! management tool whose project and work-log records are kept in sync
//! with a Notion workspace.
//!
//! # Architecture
//!
//! Every Notion-facing operation flows through the sync gateway, which
//! authenticates and authorizes the caller before delegating to the
//! schema mapper (schema discovery/mutation) or the push coordinator
//! (outbound data). Both talk to the service through the low-level
//! remote client. Results come back as a uniform `{success, data|error}`
//! envelope, and the status tracker records completion timestamps.
//!
//! # Modules
//!
//! - `remote`: HTTP client and schema mapper for the Notion API
//! - `gateway`: authenticated, admin-only entry point for schema operations
//! - `push`: outbound push coordination with the linkage guard
//! - `status`: last-sync tracking and the manual trigger
//! - `store`: SQLite-backed settings/projects/operators store
//! - `models`: local record types and the result envelope
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod push;
pub mod remote;
pub mod status;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, NotionConfig};
pub use error::SyncError;
pub use gateway::{AccessStore, GatewayResponse, Role, SchemaRequest, StatusClass, SyncGateway};
pub use models::{Project, SyncResult, WorkLogSubmission};
pub use push::{Notify, PushCoordinator, PushOutcome, PushRequest};
pub use remote::{
    format_database_id, PropertyKind, RemoteClient, RemoteProperty, RemoteTransport, SchemaMapper,
};
pub use status::{ConfigStore, LastSync, PullSummary, PullSync, SyncStatusTracker};
pub use store::SqliteStore;
