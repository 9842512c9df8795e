//! Command handlers

pub mod config;
pub mod operator;
pub mod project;
pub mod push;
pub mod schema;
pub mod status;
pub mod sync;
