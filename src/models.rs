//! Row models shared by the store and the read API

use crate::chain::ChainLog;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lossless conversion from a 256-bit on-chain integer.
///
/// Amounts never touch floating point; they travel as arbitrary-precision
/// decimals from the wire to the NUMERIC columns.
pub fn decimal_from_u256(value: alloy::primitives::U256) -> BigDecimal {
    BigDecimal::from(BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>()))
}

/// Provenance footer shared by every append-only row.
///
/// `(tx_hash, log_index)` uniquely identifies a log on the chain and is the
/// deduplication key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMeta {
    pub tx_hash: String,
    pub block_number: i64,
    pub log_index: i32,
    pub block_time: Option<DateTime<Utc>>,
    pub confirmed: bool,
}

impl LogMeta {
    /// Build provenance from a raw log. Everything the indexer writes sits at
    /// or below the confirmed head, so `confirmed` is always true here.
    pub fn from_log(log: &ChainLog, block_time: Option<DateTime<Utc>>) -> Self {
        Self {
            tx_hash: log.tx_hash.to_string(),
            block_number: log.block_number as i64,
            log_index: log.log_index as i32,
            block_time,
            confirmed: true,
        }
    }
}

/// Identity of a deployed market, read back at startup to warm the registry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PoolIdentity {
    pub pool_address: String,
    pub token_address: String,
    pub oracle_address: String,
}

/// Full pool row including the mutable snapshot columns.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pool {
    pub pool_address: String,
    pub token_address: String,
    pub oracle_address: String,
    pub created_block: i64,
    pub created_tx: String,
    pub created_time: Option<DateTime<Utc>>,
    pub reserve_usdc: Option<BigDecimal>,
    pub reserve_token: Option<BigDecimal>,
    pub spot_x18: Option<BigDecimal>,
    pub floor_x18: Option<BigDecimal>,
}

/// Insert payload for a newly discovered pool.
#[derive(Debug, Clone)]
pub struct NewPool {
    pub pool_address: String,
    pub token_address: String,
    pub oracle_address: String,
    pub created_block: i64,
    pub created_tx: String,
    pub created_time: Option<DateTime<Utc>>,
}

/// Partial snapshot update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct SnapshotUpdate {
    pub reserve_usdc: Option<BigDecimal>,
    pub reserve_token: Option<BigDecimal>,
    pub spot_x18: Option<BigDecimal>,
    pub floor_x18: Option<BigDecimal>,
}

impl SnapshotUpdate {
    pub fn prices(spot_x18: BigDecimal, floor_x18: BigDecimal) -> Self {
        Self {
            spot_x18: Some(spot_x18),
            floor_x18: Some(floor_x18),
            ..Default::default()
        }
    }

    pub fn reserves(reserve_usdc: BigDecimal, reserve_token: BigDecimal) -> Self {
        Self {
            reserve_usdc: Some(reserve_usdc),
            reserve_token: Some(reserve_token),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceUpdate {
    pub pool_address: String,
    pub price_x18: BigDecimal,
    pub floor_x18: BigDecimal,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i32,
    pub block_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPriceUpdate {
    pub pool_address: String,
    pub price_x18: BigDecimal,
    pub floor_x18: BigDecimal,
    pub meta: LogMeta,
}

#[derive(Debug, Clone)]
pub struct NewReserves {
    pub pool_address: String,
    pub reserve_usdc: BigDecimal,
    pub reserve_token: BigDecimal,
    pub meta: LogMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Swap {
    pub pool_address: String,
    pub sender: String,
    pub recipient: String,
    pub usdc_to_token: bool,
    pub amount_in: BigDecimal,
    pub amount_out: BigDecimal,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i32,
    pub block_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSwap {
    pub pool_address: String,
    pub sender: String,
    pub recipient: String,
    pub usdc_to_token: bool,
    pub amount_in: BigDecimal,
    pub amount_out: BigDecimal,
    pub meta: LogMeta,
}

/// Direction of a liquidity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityKind {
    Add,
    Remove,
}

impl LiquidityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidityKind::Add => "add",
            LiquidityKind::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewLiquidityEvent {
    pub pool_address: String,
    pub kind: LiquidityKind,
    pub provider: String,
    pub amount_usdc: BigDecimal,
    pub amount_token: BigDecimal,
    /// LP minted on add, burned on remove.
    pub lp_amount: BigDecimal,
    pub meta: LogMeta,
}

#[derive(Debug, Clone)]
pub struct NewOracleUpdate {
    pub pool_address: String,
    pub price_cumulative: BigDecimal,
    /// Oracle-reported 32-bit timestamp, not the block time.
    pub oracle_timestamp: i64,
    pub meta: LogMeta,
}

#[derive(Debug, Clone)]
pub struct NewCreatorFee {
    pub pool_address: String,
    pub amount_usdc: BigDecimal,
    pub meta: LogMeta,
}

/// One OHLC bucket over `price_updates`, computed in SQL.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Candle {
    pub bucket_time: DateTime<Utc>,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use std::str::FromStr;

    #[test]
    fn u256_conversion_is_lossless_at_the_top_of_the_range() {
        let max = U256::MAX;
        let expected = BigDecimal::from_str(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        )
        .unwrap();
        assert_eq!(decimal_from_u256(max), expected);
        assert_eq!(decimal_from_u256(U256::ZERO), BigDecimal::from(0));
        assert_eq!(
            decimal_from_u256(U256::from(1_000_000_000_000_000_000u64)),
            BigDecimal::from(1_000_000_000_000_000_000u64)
        );
    }
}
