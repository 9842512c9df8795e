//! Notion-facing remote layer
//!
//! `client` owns the HTTP plumbing (auth headers, endpoint shaping,
//! response normalization); `schema` translates the remote typed-property
//! schema into the local property model and back.

pub mod client;
pub mod schema;

pub use client::{format_database_id, RemoteClient, RemoteTransport};
pub use schema::{CreatedProperty, PropertyKind, RemoteProperty, SchemaMapper, SelectOption};
