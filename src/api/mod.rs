//! Read-only REST API over the indexed data

mod handlers;
mod responses;
mod routes;

pub use routes::*;

use crate::config::ApiConfig;
use crate::database::PgStore;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Start the API server on its own task.
pub async fn start_server(
    store: Arc<PgStore>,
    config: &ApiConfig,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = create_app(store, config);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("api server listening on {}", config.bind_address);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "api server error");
        }
    });

    Ok(handle)
}

fn create_app(store: Arc<PgStore>, config: &ApiConfig) -> Router {
    let state = ApiState { store };

    let mut app = Router::new()
        .merge(create_pool_routes())
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    if config.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<PgStore>,
}
