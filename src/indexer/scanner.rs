//! Range scanner: factory discovery, pool events, oracle events
//!
//! For a window `[from, to]` the scanner filters factory logs first, so a
//! pool created mid-window is registered (and its row inserted) before any of
//! its own logs are dispatched, then pool logs, then oracle logs.

use super::cursor::Cursor;
use super::registry::Registry;
use crate::chain::{ChainClient, ChainLog, LogQuery};
use crate::database::Store;
use crate::events::{
    self, EventCatalog, FactoryEvent, OracleLogEvent, PoolLogEvent, POOL_CREATED_SELECTOR,
};
use crate::models::{
    decimal_from_u256, LiquidityKind, LogMeta, NewCreatorFee, NewLiquidityEvent, NewOracleUpdate,
    NewPool, NewPriceUpdate, NewReserves, NewSwap, SnapshotUpdate,
};
use alloy::primitives::{Address, B256};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub struct Scanner {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn Store>,
    registry: Arc<Registry>,
    cursor: Arc<Cursor>,
    factory: Address,
    catalog: EventCatalog,
}

impl Scanner {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn Store>,
        registry: Arc<Registry>,
        cursor: Arc<Cursor>,
        factory: Address,
    ) -> Self {
        Self {
            chain,
            store,
            registry,
            cursor,
            factory,
            catalog: EventCatalog::new(),
        }
    }

    /// Scan one inclusive block window. A failed filter query fails the whole
    /// range; a failed individual log is logged and skipped.
    pub async fn scan_range(&self, from: u64, to: u64) -> Result<()> {
        info!(from, to, "scanning range");

        let factory_query = LogQuery::range(from, to)
            .addresses(vec![self.factory])
            .topic0(vec![POOL_CREATED_SELECTOR]);
        for log in self.chain.filter_logs(&factory_query).await? {
            if let Err(e) = self.handle_factory_log(&log).await {
                warn!(error = %e, tx = %log.tx_hash, "factory log handling failed");
            }
        }

        // Snapshots are taken after factory handling so pools discovered in
        // this very window are filtered for their own first logs.
        let pool_addresses = self.registry.pool_addresses().await;
        if !pool_addresses.is_empty() {
            let query = LogQuery::range(from, to).addresses(pool_addresses);
            for log in self.chain.filter_logs(&query).await? {
                if let Err(e) = self.handle_pool_log(&log).await {
                    warn!(error = %e, tx = %log.tx_hash, "pool log handling failed");
                }
            }
        }

        let oracle_addresses = self.registry.oracle_addresses().await;
        if !oracle_addresses.is_empty() {
            let query = LogQuery::range(from, to).addresses(oracle_addresses);
            for log in self.chain.filter_logs(&query).await? {
                if let Err(e) = self.handle_oracle_log(&log).await {
                    warn!(error = %e, tx = %log.tx_hash, "oracle log handling failed");
                }
            }
        }

        self.cursor.advance_to(to).await;
        Ok(())
    }

    async fn handle_factory_log(&self, log: &ChainLog) -> Result<()> {
        let Some(FactoryEvent::PoolCreated { token, pool, oracle }) =
            events::decode_factory_log(log)?
        else {
            return Ok(());
        };
        let created_time = self.block_time(log.block_hash).await;
        self.store
            .upsert_pool(&NewPool {
                pool_address: pool.to_string(),
                token_address: token.to_string(),
                oracle_address: oracle.to_string(),
                created_block: log.block_number as i64,
                created_tx: log.tx_hash.to_string(),
                created_time,
            })
            .await?;
        self.registry.insert_pool(pool, oracle).await;
        info!(pool = %pool, token = %token, block = log.block_number, "pool discovered");
        Ok(())
    }

    async fn handle_pool_log(&self, log: &ChainLog) -> Result<()> {
        let Some(event) = events::decode_pool_log(log)? else {
            self.note_unknown_selector(log);
            return Ok(());
        };
        let pool_address = log.address.to_string();
        let meta = self.log_meta(log).await;

        match event {
            PoolLogEvent::PriceUpdate {
                price_x18,
                floor_x18,
            } => {
                let price_x18 = decimal_from_u256(price_x18);
                let floor_x18 = decimal_from_u256(floor_x18);
                self.store
                    .insert_price_update(&NewPriceUpdate {
                        pool_address: pool_address.clone(),
                        price_x18: price_x18.clone(),
                        floor_x18: floor_x18.clone(),
                        meta,
                    })
                    .await?;
                let update = SnapshotUpdate::prices(price_x18, floor_x18);
                if let Err(e) = self.store.update_snapshot(&pool_address, &update).await {
                    warn!(error = %e, pool = %pool_address, "snapshot price update failed");
                }
            }
            PoolLogEvent::Sync {
                reserve_usdc,
                reserve_token,
            } => {
                let reserve_usdc = decimal_from_u256(reserve_usdc);
                let reserve_token = decimal_from_u256(reserve_token);
                self.store
                    .insert_reserves(&NewReserves {
                        pool_address: pool_address.clone(),
                        reserve_usdc: reserve_usdc.clone(),
                        reserve_token: reserve_token.clone(),
                        meta,
                    })
                    .await?;
                let update = SnapshotUpdate::reserves(reserve_usdc, reserve_token);
                if let Err(e) = self.store.update_snapshot(&pool_address, &update).await {
                    warn!(error = %e, pool = %pool_address, "snapshot reserve update failed");
                }
            }
            PoolLogEvent::Swap {
                sender,
                recipient,
                amount_in,
                amount_out,
                usdc_to_token,
            } => {
                self.store
                    .insert_swap(&NewSwap {
                        pool_address,
                        sender: sender.to_string(),
                        recipient: recipient.to_string(),
                        usdc_to_token,
                        amount_in: decimal_from_u256(amount_in),
                        amount_out: decimal_from_u256(amount_out),
                        meta,
                    })
                    .await?;
            }
            PoolLogEvent::AddLiquidity {
                provider,
                amount_usdc,
                amount_token,
                lp_minted,
            } => {
                self.store
                    .insert_liquidity_event(&NewLiquidityEvent {
                        pool_address,
                        kind: LiquidityKind::Add,
                        provider: provider.to_string(),
                        amount_usdc: decimal_from_u256(amount_usdc),
                        amount_token: decimal_from_u256(amount_token),
                        lp_amount: decimal_from_u256(lp_minted),
                        meta,
                    })
                    .await?;
            }
            PoolLogEvent::RemoveLiquidity {
                provider,
                lp_burned,
                amount_usdc,
                amount_token,
            } => {
                self.store
                    .insert_liquidity_event(&NewLiquidityEvent {
                        pool_address,
                        kind: LiquidityKind::Remove,
                        provider: provider.to_string(),
                        amount_usdc: decimal_from_u256(amount_usdc),
                        amount_token: decimal_from_u256(amount_token),
                        lp_amount: decimal_from_u256(lp_burned),
                        meta,
                    })
                    .await?;
            }
            PoolLogEvent::CollectCreatorFees { amount_usdc } => {
                self.store
                    .insert_creator_fee(&NewCreatorFee {
                        pool_address,
                        amount_usdc: decimal_from_u256(amount_usdc),
                        meta,
                    })
                    .await?;
            }
            PoolLogEvent::InitialTokenSeeded => {
                trace!(pool = %pool_address, "initial token seed observed");
            }
        }
        Ok(())
    }

    async fn handle_oracle_log(&self, log: &ChainLog) -> Result<()> {
        let Some(OracleLogEvent::OracleUpdate {
            price_cumulative,
            timestamp,
        }) = events::decode_oracle_log(log)?
        else {
            self.note_unknown_selector(log);
            return Ok(());
        };
        let Some(pool) = self.registry.resolve_oracle(log.address).await? else {
            // Out-of-order or foreign oracle; nothing to attribute the row to.
            trace!(oracle = %log.address, "oracle log without a known pool, dropping");
            return Ok(());
        };
        let meta = self.log_meta(log).await;
        self.store
            .insert_oracle_update(&NewOracleUpdate {
                pool_address: pool.to_string(),
                price_cumulative: decimal_from_u256(price_cumulative),
                oracle_timestamp: timestamp as i64,
                meta,
            })
            .await?;
        Ok(())
    }

    async fn log_meta(&self, log: &ChainLog) -> LogMeta {
        LogMeta::from_log(log, self.block_time(log.block_hash).await)
    }

    /// Header lookup for the block timestamp; failure leaves the column null.
    async fn block_time(&self, hash: B256) -> Option<DateTime<Utc>> {
        match self.chain.header_by_hash(hash).await {
            Ok(header) => DateTime::from_timestamp(header.timestamp as i64, 0),
            Err(e) => {
                debug!(error = %e, block_hash = %hash, "header fetch failed, block_time stays null");
                None
            }
        }
    }

    fn note_unknown_selector(&self, log: &ChainLog) {
        if let Some(selector) = log.selector() {
            if self.catalog.lookup(&selector).is_none() {
                trace!(selector = %selector, address = %log.address, "ignoring unknown selector");
            }
        }
    }
}
