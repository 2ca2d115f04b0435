//! In-memory registry of indexed pools and their oracles

use crate::database::Store;
use alloy::primitives::Address;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Default)]
struct Inner {
    pools: HashSet<Address>,
    oracles: HashMap<Address, Address>,
}

/// Pool set and oracle→pool map shared by the backfill and tail drivers.
///
/// The lock is held only for map access, never across I/O; scans take an
/// address snapshot and release the read side before filtering logs.
pub struct Registry {
    store: Arc<dyn Store>,
    inner: RwLock<Inner>,
}

impl Registry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Rehydrate from the store so a restart does not re-pay discovery.
    /// Returns the number of pools loaded.
    pub async fn warm_start(&self) -> Result<usize> {
        let rows = self.store.warm_registry().await?;
        let mut inner = self.inner.write().await;
        for row in &rows {
            let (Ok(pool), Ok(oracle)) = (
                Address::from_str(&row.pool_address),
                Address::from_str(&row.oracle_address),
            ) else {
                warn!(pool = %row.pool_address, "unparseable address in pools table, skipping");
                continue;
            };
            inner.pools.insert(pool);
            inner.oracles.insert(oracle, pool);
        }
        Ok(inner.pools.len())
    }

    pub async fn insert_pool(&self, pool: Address, oracle: Address) {
        let mut inner = self.inner.write().await;
        inner.pools.insert(pool);
        inner.oracles.insert(oracle, pool);
    }

    /// Snapshot of the pool address set.
    pub async fn pool_addresses(&self) -> Vec<Address> {
        self.inner.read().await.pools.iter().copied().collect()
    }

    /// Snapshot of the oracle address set.
    pub async fn oracle_addresses(&self) -> Vec<Address> {
        self.inner.read().await.oracles.keys().copied().collect()
    }

    pub async fn contains_pool(&self, pool: Address) -> bool {
        self.inner.read().await.pools.contains(&pool)
    }

    /// Pool owning `oracle`, falling back to a store lookup when the map
    /// misses (cold start, or replay before the creation block). A store hit
    /// is cached; a miss means the oracle belongs to no indexed pool.
    pub async fn resolve_oracle(&self, oracle: Address) -> Result<Option<Address>> {
        if let Some(pool) = self.inner.read().await.oracles.get(&oracle).copied() {
            return Ok(Some(pool));
        }
        let Some(stored) = self.store.lookup_pool_by_oracle(&oracle.to_string()).await? else {
            return Ok(None);
        };
        let Ok(pool) = Address::from_str(&stored) else {
            warn!(oracle = %oracle, pool = %stored, "unparseable pool address from store");
            return Ok(None);
        };
        self.inner.write().await.oracles.insert(oracle, pool);
        Ok(Some(pool))
    }
}
