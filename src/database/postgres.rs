//! PostgreSQL store

use super::Store;
use crate::config::PostgresConfig;
use crate::models::{
    Candle, NewCreatorFee, NewLiquidityEvent, NewOracleUpdate, NewPool, NewPriceUpdate,
    NewReserves, NewSwap, Pool, PoolIdentity, PriceUpdate, SnapshotUpdate, Swap,
};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

const CONNECT_PING_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect, ping with a 10 s budget, and apply pending migrations.
    ///
    /// The schema itself lives under `migrations/`; nothing here creates
    /// tables ad hoc.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.dsn)
            .await?;

        tokio::time::timeout(CONNECT_PING_TIMEOUT, sqlx::query("SELECT 1").execute(&pool))
            .await
            .map_err(|_| anyhow::anyhow!("database ping timed out"))??;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database connected and migrated");

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ----- read side (API queries) -----

    /// All pools, newest first.
    pub async fn list_pools(&self) -> Result<Vec<Pool>> {
        let pools = sqlx::query_as::<_, Pool>(
            r#"
            SELECT pool_address, token_address, oracle_address, created_block, created_tx,
                   created_time, reserve_usdc, reserve_token, spot_x18, floor_x18
            FROM pools ORDER BY created_block DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pools)
    }

    pub async fn get_pool(&self, pool_address: &str) -> Result<Option<Pool>> {
        let pool = sqlx::query_as::<_, Pool>(
            r#"
            SELECT pool_address, token_address, oracle_address, created_block, created_tx,
                   created_time, reserve_usdc, reserve_token, spot_x18, floor_x18
            FROM pools WHERE pool_address = $1
            "#,
        )
        .bind(pool_address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pool)
    }

    /// Raw price rows for a pool, newest first.
    pub async fn price_updates(
        &self,
        pool_address: &str,
        from_block: i64,
        limit: i64,
    ) -> Result<Vec<PriceUpdate>> {
        let rows = sqlx::query_as::<_, PriceUpdate>(
            r#"
            SELECT pool_address, price_x18, floor_x18, block_number, tx_hash, log_index, block_time
            FROM price_updates
            WHERE pool_address = $1 AND block_number >= $2
            ORDER BY block_number DESC, log_index DESC
            LIMIT $3
            "#,
        )
        .bind(pool_address)
        .bind(from_block)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Swap history for a pool, newest first.
    pub async fn swaps(&self, pool_address: &str, limit: i64) -> Result<Vec<Swap>> {
        let rows = sqlx::query_as::<_, Swap>(
            r#"
            SELECT pool_address, sender, recipient, usdc_to_token, amount_in, amount_out,
                   block_number, tx_hash, log_index, block_time
            FROM swaps
            WHERE pool_address = $1
            ORDER BY block_number DESC, log_index DESC
            LIMIT $2
            "#,
        )
        .bind(pool_address)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// OHLC buckets over `price_updates`, oldest first.
    pub async fn candles(
        &self,
        pool_address: &str,
        bucket_seconds: i64,
        limit: i64,
    ) -> Result<Vec<Candle>> {
        let rows = sqlx::query_as::<_, Candle>(
            r#"
            WITH b AS (
                SELECT to_timestamp(floor(extract(epoch FROM coalesce(block_time, now())) / $2) * $2)
                           AS bucket_time,
                       price_x18, block_time
                FROM price_updates WHERE pool_address = $1
            ), o AS (
                SELECT bucket_time,
                       (ARRAY_AGG(price_x18 ORDER BY block_time ASC))[1]  AS open,
                       MAX(price_x18)                                     AS high,
                       MIN(price_x18)                                     AS low,
                       (ARRAY_AGG(price_x18 ORDER BY block_time DESC))[1] AS close
                FROM b GROUP BY bucket_time ORDER BY bucket_time DESC LIMIT $3
            )
            SELECT bucket_time, open, high, low, close FROM o ORDER BY bucket_time ASC
            "#,
        )
        .bind(pool_address)
        .bind(bucket_seconds)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn warm_registry(&self) -> Result<Vec<PoolIdentity>> {
        let pools = sqlx::query_as::<_, PoolIdentity>(
            "SELECT pool_address, token_address, oracle_address FROM pools",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pools)
    }

    async fn upsert_pool(&self, pool: &NewPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pools (pool_address, token_address, oracle_address, created_block,
                               created_tx, created_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (pool_address) DO UPDATE SET
                token_address = EXCLUDED.token_address,
                oracle_address = EXCLUDED.oracle_address
            "#,
        )
        .bind(&pool.pool_address)
        .bind(&pool.token_address)
        .bind(&pool.oracle_address)
        .bind(pool.created_block)
        .bind(&pool.created_tx)
        .bind(pool.created_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_snapshot(&self, pool_address: &str, update: &SnapshotUpdate) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE pools SET
                reserve_usdc  = COALESCE($2, reserve_usdc),
                reserve_token = COALESCE($3, reserve_token),
                spot_x18      = COALESCE($4, spot_x18),
                floor_x18     = COALESCE($5, floor_x18)
            WHERE pool_address = $1
            "#,
        )
        .bind(pool_address)
        .bind(update.reserve_usdc.clone())
        .bind(update.reserve_token.clone())
        .bind(update.spot_x18.clone())
        .bind(update.floor_x18.clone())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_price_update(&self, row: &NewPriceUpdate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO price_updates (pool_address, price_x18, floor_x18, block_number,
                                       tx_hash, log_index, block_time, confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tx_hash, log_index) DO NOTHING
            "#,
        )
        .bind(&row.pool_address)
        .bind(row.price_x18.clone())
        .bind(row.floor_x18.clone())
        .bind(row.meta.block_number)
        .bind(&row.meta.tx_hash)
        .bind(row.meta.log_index)
        .bind(row.meta.block_time)
        .bind(row.meta.confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_reserves(&self, row: &NewReserves) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reserves (pool_address, reserve_usdc, reserve_token, block_number,
                                  tx_hash, log_index, block_time, confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tx_hash, log_index) DO NOTHING
            "#,
        )
        .bind(&row.pool_address)
        .bind(row.reserve_usdc.clone())
        .bind(row.reserve_token.clone())
        .bind(row.meta.block_number)
        .bind(&row.meta.tx_hash)
        .bind(row.meta.log_index)
        .bind(row.meta.block_time)
        .bind(row.meta.confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_swap(&self, row: &NewSwap) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO swaps (pool_address, sender, usdc_to_token, amount_in, amount_out,
                               recipient, block_number, tx_hash, log_index, block_time, confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (tx_hash, log_index) DO NOTHING
            "#,
        )
        .bind(&row.pool_address)
        .bind(&row.sender)
        .bind(row.usdc_to_token)
        .bind(row.amount_in.clone())
        .bind(row.amount_out.clone())
        .bind(&row.recipient)
        .bind(row.meta.block_number)
        .bind(&row.meta.tx_hash)
        .bind(row.meta.log_index)
        .bind(row.meta.block_time)
        .bind(row.meta.confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_liquidity_event(&self, row: &NewLiquidityEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO liquidity_events (pool_address, event_type, provider, amount_usdc,
                                          amount_token, lp_amount, block_number, tx_hash,
                                          log_index, block_time, confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (tx_hash, log_index) DO NOTHING
            "#,
        )
        .bind(&row.pool_address)
        .bind(row.kind.as_str())
        .bind(&row.provider)
        .bind(row.amount_usdc.clone())
        .bind(row.amount_token.clone())
        .bind(row.lp_amount.clone())
        .bind(row.meta.block_number)
        .bind(&row.meta.tx_hash)
        .bind(row.meta.log_index)
        .bind(row.meta.block_time)
        .bind(row.meta.confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_oracle_update(&self, row: &NewOracleUpdate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO oracle_updates (pool_address, price_cumulative, oracle_timestamp,
                                        block_number, tx_hash, log_index, block_time, confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tx_hash, log_index) DO NOTHING
            "#,
        )
        .bind(&row.pool_address)
        .bind(row.price_cumulative.clone())
        .bind(row.oracle_timestamp)
        .bind(row.meta.block_number)
        .bind(&row.meta.tx_hash)
        .bind(row.meta.log_index)
        .bind(row.meta.block_time)
        .bind(row.meta.confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_creator_fee(&self, row: &NewCreatorFee) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO creator_fees (pool_address, amount_usdc, block_number, tx_hash,
                                      log_index, block_time, confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tx_hash, log_index) DO NOTHING
            "#,
        )
        .bind(&row.pool_address)
        .bind(row.amount_usdc.clone())
        .bind(row.meta.block_number)
        .bind(&row.meta.tx_hash)
        .bind(row.meta.log_index)
        .bind(row.meta.block_time)
        .bind(row.meta.confirmed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn lookup_pool_by_oracle(&self, oracle_address: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT pool_address FROM pools WHERE oracle_address = $1")
                .bind(oracle_address)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(pool_address,)| pool_address))
    }
}
