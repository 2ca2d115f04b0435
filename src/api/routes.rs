//! API route definitions

use super::{handlers::*, ApiState};
use axum::{routing::get, Router};

/// Pool-related routes backed by the indexed tables.
pub fn create_pool_routes() -> Router<ApiState> {
    Router::new()
        .route("/pools", get(list_pools))
        .route("/pools/:address/state", get(get_pool_state))
        .route("/pools/:address/price-updates", get(get_price_updates))
        .route("/pools/:address/swaps", get(get_pool_swaps))
        .route("/pools/:address/candles", get(get_pool_candles))
}
