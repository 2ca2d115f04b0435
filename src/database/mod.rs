//! Durable storage layer
//!
//! The indexer core writes through the [`Store`] trait so tests can run
//! against an in-memory fake; production uses [`postgres::PgStore`].

pub mod postgres;

pub use postgres::PgStore;

use crate::models::{
    NewCreatorFee, NewLiquidityEvent, NewOracleUpdate, NewPool, NewPriceUpdate, NewReserves,
    NewSwap, PoolIdentity, SnapshotUpdate,
};
use anyhow::Result;
use async_trait::async_trait;

/// Store contract used by the scanner and registry.
///
/// Append-only inserts are idempotent on `(tx_hash, log_index)`: replaying a
/// window must not produce duplicates, so re-insertion of an already stored
/// log is a no-op.
#[async_trait]
pub trait Store: Send + Sync {
    /// All known pools, read once at startup to warm the registry.
    async fn warm_registry(&self) -> Result<Vec<PoolIdentity>>;

    /// Idempotent on pool address; token and oracle never change in practice,
    /// so overwriting them on conflict is a tolerated no-op.
    async fn upsert_pool(&self, pool: &NewPool) -> Result<()>;

    /// Partial in-place update of the pool snapshot columns.
    async fn update_snapshot(&self, pool_address: &str, update: &SnapshotUpdate) -> Result<()>;

    async fn insert_price_update(&self, row: &NewPriceUpdate) -> Result<()>;

    async fn insert_reserves(&self, row: &NewReserves) -> Result<()>;

    async fn insert_swap(&self, row: &NewSwap) -> Result<()>;

    async fn insert_liquidity_event(&self, row: &NewLiquidityEvent) -> Result<()>;

    async fn insert_oracle_update(&self, row: &NewOracleUpdate) -> Result<()>;

    async fn insert_creator_fee(&self, row: &NewCreatorFee) -> Result<()>;

    /// Resolve the pool owning an oracle, for out-of-order oracle logs.
    async fn lookup_pool_by_oracle(&self, oracle_address: &str) -> Result<Option<String>>;
}
