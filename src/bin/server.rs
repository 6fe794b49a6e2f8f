use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zonefield_rs::{ZoneTable, describe_zip};

/// Server configuration
struct ServerConfig {
    port: u16,
    /// Store domain for the suggestion proxy. Optional: without it the zone
    /// endpoint still works and /api/suggest returns 503.
    store_domain: Option<String>,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            store_domain: env::var(zonefield_rs::config::ENV_STORE_DOMAIN)
                .ok()
                .filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Application state shared across all requests
#[derive(Clone)]
struct AppState {
    zones: Arc<ZoneTable>,
    http: reqwest::Client,
    store_domain: Option<String>,
    metrics: Arc<Metrics>,
}

/// Server metrics
struct Metrics {
    total_requests: AtomicU64,
    requests_in_flight: AtomicU64,
    start_time: Instant,
}

/// RAII guard for tracking in-flight requests
struct RequestGuard<'a>(&'a AtomicU64);

impl<'a> Drop for RequestGuard<'a> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let zones = Arc::new(ZoneTable::bundled().context("Failed to load zone table")?);
    tracing::info!(prefixes = zones.len(), "Zone table loaded");
    if config.store_domain.is_none() {
        tracing::warn!("No store domain configured; /api/suggest is disabled");
    }

    let app = build_app(zones, config.store_domain.clone())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Build the Axum application with routes and middleware
fn build_app(zones: Arc<ZoneTable>, store_domain: Option<String>) -> Result<Router> {
    let metrics = Arc::new(Metrics {
        total_requests: AtomicU64::new(0),
        requests_in_flight: AtomicU64::new(0),
        start_time: Instant::now(),
    });

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let state = AppState {
        zones,
        http,
        store_domain,
        metrics,
    };

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/api/zone/:zip", get(resolve_zone))
        .route("/api/suggest", get(suggest))
        .route("/api/metrics", get(get_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state))
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Resolve a ZIP code for the zone-selector widget
async fn resolve_zone(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Json<ZoneResponse>, ApiError> {
    state.metrics.total_requests.fetch_add(1, Ordering::Relaxed);
    state
        .metrics
        .requests_in_flight
        .fetch_add(1, Ordering::Relaxed);
    let _guard = RequestGuard(&state.metrics.requests_in_flight);

    if zip.len() != 5 || !zip.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "ZIP code must be 5 digits".to_string(),
        ));
    }

    let info = state
        .zones
        .resolve(&zip)
        .ok_or_else(|| ApiError::NotFound(format!("No zone data for ZIP {zip}")))?;

    Ok(Json(ZoneResponse {
        zip: zip.clone(),
        location: describe_zip(&zip),
        zone: info.zone,
        min: info.min,
        max: info.max,
    }))
}

#[derive(Serialize)]
struct ZoneResponse {
    zip: String,
    location: String,
    zone: String,
    min: i32,
    max: i32,
}

/// Predictive-search suggestions, proxied from the storefront endpoint
async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestResponse>, ApiError> {
    state.metrics.total_requests.fetch_add(1, Ordering::Relaxed);
    state
        .metrics
        .requests_in_flight
        .fetch_add(1, Ordering::Relaxed);
    let _guard = RequestGuard(&state.metrics.requests_in_flight);

    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("q must not be empty".to_string()));
    }

    let domain = state
        .store_domain
        .as_deref()
        .ok_or_else(|| ApiError::Unavailable("Store domain not configured".to_string()))?;

    let url = format!("https://{domain}/search/suggest.json");
    let upstream: StorefrontSuggest = state
        .http
        .get(&url)
        .query(&[
            ("q", query.as_str()),
            ("resources[type]", "product,collection"),
            ("resources[limit]", "8"),
        ])
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Suggestion request failed: {}", e);
            ApiError::InternalError(e.to_string())
        })?
        .json()
        .await
        .map_err(|e| {
            tracing::error!("Malformed suggestion response: {}", e);
            ApiError::InternalError(e.to_string())
        })?;

    let results = upstream.resources.results;
    Ok(Json(SuggestResponse {
        query,
        products: results.products,
        collections: results.collections,
    }))
}

#[derive(Deserialize)]
struct SuggestParams {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct StorefrontSuggest {
    resources: SuggestResources,
}

#[derive(Deserialize)]
struct SuggestResources {
    results: SuggestResults,
}

#[derive(Deserialize, Default)]
struct SuggestResults {
    #[serde(default)]
    products: Vec<Suggestion>,
    #[serde(default)]
    collections: Vec<Suggestion>,
}

#[derive(Serialize, Deserialize)]
struct Suggestion {
    title: String,
    url: String,
}

#[derive(Serialize)]
struct SuggestResponse {
    query: String,
    products: Vec<Suggestion>,
    collections: Vec<Suggestion>,
}

/// Get server metrics
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        total_requests: state.metrics.total_requests.load(Ordering::Relaxed),
        requests_in_flight: state.metrics.requests_in_flight.load(Ordering::Relaxed),
        uptime_seconds: state.metrics.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct MetricsResponse {
    total_requests: u64,
    requests_in_flight: u64,
    uptime_seconds: u64,
}

/// API error types
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}
