//! HTTP server and request pipeline
//!
//! Every GET, whatever its path, is fingerprinted and answered from the
//! cache when possible, otherwise fetched from the origin, returned to the
//! client and stored. An optional second listener serves /health.

use crate::cache::ResponseCache;
use crate::error::{ProxyError, Result};
use crate::fingerprint::fingerprint;
use crate::materialize::{from_entry, materialize};
use crate::origin::OriginClient;
use crate::sweeper::spawn_sweeper;
use crate::types::{CacheEntry, CacheStatus, HealthResponse, ProxyConfig};
use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: ResponseCache,
    pub origin: OriginClient,
    pub max_body_bytes: usize,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: ResponseCache, origin: OriginClient, max_body_bytes: usize) -> Self {
        Self {
            cache,
            origin,
            max_body_bytes,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the proxy router. Every path goes through the pipeline.
pub fn create_router(state: SharedState) -> Router {
    Router::new().fallback(handle).with_state(state)
}

/// Create the router for the stats listener
pub fn create_stats_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

/// Build the cache, start the sweeper and listeners, and serve until Ctrl-C
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let cache = ResponseCache::new();
    let origin = OriginClient::new(&config.origin, config.origin_timeout)?;
    let state: SharedState = Arc::new(ServerState::new(
        cache.clone(),
        origin,
        config.max_body_bytes,
    ));

    spawn_sweeper(cache, config.ttl);

    if let Some(stats_port) = config.stats_port {
        let stats_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = start_stats_server(stats_state, stats_port).await {
                error!("Stats server error: {}", e);
            }
        });
    }

    start_server(state, config.port).await?;
    Ok(())
}

/// Start the proxy listener
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Start the stats listener
pub async fn start_stats_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_stats_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting stats server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

/// Proxy entry point for every path
async fn handle(State(state): State<SharedState>, request: Request) -> Response {
    match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Request failed");
            e.into_response()
        }
    }
}

async fn forward(state: &ServerState, request: Request) -> Result<Response> {
    let started = Instant::now();
    let (parts, body) = request.into_parts();

    if parts.method != Method::GET {
        return Err(ProxyError::MethodNotAllowed(parts.method));
    }

    let path = parts.uri.path();
    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| ProxyError::Fingerprint(e.to_string()))?;
    let key = fingerprint(path, &parts.headers, &body);

    if let Some(entry) = state.cache.get(&key).await {
        info!(
            path,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response served from cache"
        );
        return Ok(from_entry(entry));
    }

    let fetched = state.origin.fetch(path).await.map_err(|e| {
        error!(path, url = %state.origin.url_for(path), error = %e, "Origin request failed");
        e
    })?;

    let response = materialize(
        fetched.status,
        &fetched.headers,
        fetched.body.clone(),
        CacheStatus::Miss,
    );

    state
        .cache
        .put(
            key,
            CacheEntry::new(fetched.status, fetched.headers, fetched.body),
        )
        .await;

    info!(
        path,
        status = %fetched.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Response cached"
    );

    Ok(response)
}
