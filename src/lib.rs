//! Launchpad protocol indexer
//!
//! Ingests factory, pool, and oracle events from a chain node, persists them
//! in PostgreSQL, and serves read-only queries over the indexed data.

pub mod api;
pub mod chain;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod indexer;
pub mod models;

pub use config::IndexerConfig;
pub use database::{PgStore, Store};
pub use indexer::Indexer;
