//! API request handlers

use super::{responses::*, ApiState};
use alloy::primitives::Address;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::str::FromStr;

/// Query parameters for the price-update listing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdatesQuery {
    pub limit: Option<i64>,
    pub from_block: Option<i64>,
}

/// Query parameters for the swap listing.
#[derive(Deserialize)]
pub struct SwapsQuery {
    pub limit: Option<i64>,
}

/// Query parameters for candles.
#[derive(Deserialize)]
pub struct CandlesQuery {
    pub interval: Option<String>,
    pub limit: Option<i64>,
}

/// List all pools, newest first.
pub async fn list_pools(
    State(state): State<ApiState>,
) -> Result<Json<Vec<PoolResponse>>, StatusCode> {
    let pools = state.store.list_pools().await.map_err(internal_error)?;
    Ok(Json(pools.into_iter().map(Into::into).collect()))
}

/// Current state of one pool.
pub async fn get_pool_state(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<PoolResponse>, StatusCode> {
    let address = normalize_address(&address)?;
    let pool = state
        .store
        .get_pool(&address)
        .await
        .map_err(internal_error)?;
    match pool {
        Some(pool) => Ok(Json(pool.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Raw price updates for a pool, newest first.
pub async fn get_price_updates(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Query(query): Query<PriceUpdatesQuery>,
) -> Result<Json<Vec<PriceUpdateResponse>>, StatusCode> {
    let address = normalize_address(&address)?;
    let limit = query.limit.unwrap_or(200).clamp(1, 1000);
    let from_block = query.from_block.unwrap_or(0);
    let rows = state
        .store
        .price_updates(&address, from_block, limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Swap history for a pool, newest first.
pub async fn get_pool_swaps(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Query(query): Query<SwapsQuery>,
) -> Result<Json<Vec<SwapResponse>>, StatusCode> {
    let address = normalize_address(&address)?;
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);
    let rows = state
        .store
        .swaps(&address, limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Time-bucketed OHLC candles over the price updates.
pub async fn get_pool_candles(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Query(query): Query<CandlesQuery>,
) -> Result<Json<Vec<CandleResponse>>, StatusCode> {
    let address = normalize_address(&address)?;
    let interval = query.interval.as_deref().unwrap_or("5m");
    let bucket = bucket_seconds(interval).ok_or(StatusCode::BAD_REQUEST)?;
    let limit = query.limit.unwrap_or(200).clamp(1, 1000);
    let rows = state
        .store
        .candles(&address, bucket, limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Accept any case on the wire, store and query in checksum form.
fn normalize_address(raw: &str) -> Result<String, StatusCode> {
    Address::from_str(raw)
        .map(|a| a.to_string())
        .map_err(|_| StatusCode::BAD_REQUEST)
}

/// Parse `<n>[mhd]` into bucket seconds.
fn bucket_seconds(interval: &str) -> Option<i64> {
    let unit = interval.chars().last()?;
    let digits = &interval[..interval.len() - unit.len_utf8()];
    let n: i64 = digits.parse().ok()?;
    if n <= 0 {
        return None;
    }
    match unit {
        'm' => Some(n * 60),
        'h' => Some(n * 3600),
        'd' => Some(n * 86400),
        _ => None,
    }
}

fn internal_error(e: anyhow::Error) -> StatusCode {
    tracing::error!(error = %e, "api query failed");
    StatusCode::INTERNAL_SERVER_ERROR
}
