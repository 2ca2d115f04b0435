//! JSON response shapes for the read API

use crate::models::{Candle, Pool, PriceUpdate, Swap};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolResponse {
    pub pool: String,
    pub token: String,
    pub oracle: String,
    pub created_block: i64,
    pub created_tx: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(rename = "reserveUSDC", skip_serializing_if = "Option::is_none")]
    pub reserve_usdc: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_token: Option<BigDecimal>,
    #[serde(rename = "spotX18", skip_serializing_if = "Option::is_none")]
    pub spot_x18: Option<BigDecimal>,
    #[serde(rename = "floorX18", skip_serializing_if = "Option::is_none")]
    pub floor_x18: Option<BigDecimal>,
}

impl From<Pool> for PoolResponse {
    fn from(p: Pool) -> Self {
        Self {
            pool: p.pool_address,
            token: p.token_address,
            oracle: p.oracle_address,
            created_block: p.created_block,
            created_tx: p.created_tx,
            created_time: p.created_time,
            reserve_usdc: p.reserve_usdc,
            reserve_token: p.reserve_token,
            spot_x18: p.spot_x18,
            floor_x18: p.floor_x18,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdateResponse {
    #[serde(rename = "priceX18")]
    pub price_x18: BigDecimal,
    #[serde(rename = "floorX18")]
    pub floor_x18: BigDecimal,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<DateTime<Utc>>,
}

impl From<PriceUpdate> for PriceUpdateResponse {
    fn from(r: PriceUpdate) -> Self {
        Self {
            price_x18: r.price_x18,
            floor_x18: r.floor_x18,
            block_number: r.block_number,
            tx_hash: r.tx_hash,
            log_index: r.log_index,
            block_time: r.block_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub sender: String,
    #[serde(rename = "usdcToToken")]
    pub usdc_to_token: bool,
    pub amount_in: BigDecimal,
    pub amount_out: BigDecimal,
    pub recipient: String,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<DateTime<Utc>>,
}

impl From<Swap> for SwapResponse {
    fn from(r: Swap) -> Self {
        Self {
            sender: r.sender,
            usdc_to_token: r.usdc_to_token,
            amount_in: r.amount_in,
            amount_out: r.amount_out,
            recipient: r.recipient,
            block_number: r.block_number,
            tx_hash: r.tx_hash,
            log_index: r.log_index,
            block_time: r.block_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleResponse {
    pub bucket_time: DateTime<Utc>,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
}

impl From<Candle> for CandleResponse {
    fn from(c: Candle) -> Self {
        Self {
            bucket_time: c.bucket_time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }
}
