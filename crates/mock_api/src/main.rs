use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ItemsResponse, HEALTH_ROUTE, ITEMS_ROUTE},
};
use tracing::{info, warn};

mod config;

use config::{load_settings, Settings};

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(
        %addr,
        latency_ms = settings.latency.as_millis() as u64,
        fail_items = settings.fail_items,
        items = settings.items.len(),
        "mock api listening"
    );

    let app = build_router(AppState {
        settings: Arc::new(settings),
    });
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(healthz))
        .route(ITEMS_ROUTE, get(list_items))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<ItemsResponse>, (StatusCode, Json<ApiError>)> {
    if !state.settings.latency.is_zero() {
        tokio::time::sleep(state.settings.latency).await;
    }

    if state.settings.fail_items {
        warn!("items request rejected by fail_items setting");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(
                ErrorCode::Internal,
                "items are unavailable (fail_items is set)",
            )),
        ));
    }

    info!(count = state.settings.items.len(), "serving items");
    Ok(Json(ItemsResponse::now(state.settings.items.clone())))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
