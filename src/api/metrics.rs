//! Prometheus metrics endpoint and HTTP request tracking middleware.
//!
//! This module provides:
//! - A `/metrics` endpoint that returns Prometheus-formatted metrics
//! - Middleware for tracking HTTP request counts and durations
//! - Counters for favorite mutations

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;

use super::error::ApiError;
use crate::db::{CatalogKind, Favorite};
use crate::AppState;

// Metric names as constants for consistency
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const FAVORITES_ADDED_TOTAL: &str = "favorites_added_total";
pub const FAVORITES_REMOVED_TOTAL: &str = "favorites_removed_total";
pub const CATALOG_ROWS: &str = "catalog_rows";
pub const FAVORITES_STORED: &str = "favorites_stored";

/// Initialize the Prometheus metrics recorder and return a handle for rendering metrics.
///
/// This should be called once during application startup.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests received"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_counter!(FAVORITES_ADDED_TOTAL, "Favorites added, by catalog kind");
    describe_counter!(FAVORITES_REMOVED_TOTAL, "Favorites removed, by catalog kind");
    describe_gauge!(CATALOG_ROWS, "Rows per catalog table");
    describe_gauge!(FAVORITES_STORED, "Stored favorites, by catalog kind");

    Ok(handle)
}

/// GET /metrics - Returns Prometheus-formatted metrics.
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> Response {
    update_gauge_metrics(&state).await;

    match state.metrics_handle.as_ref() {
        Some(h) => (StatusCode::OK, h.render()).into_response(),
        None => ApiError::internal("Metrics not initialized").into_response(),
    }
}

/// Refresh row-count gauges from the database.
async fn update_gauge_metrics(state: &AppState) {
    for table in ["users", "planets", "people"] {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        if let Ok(count) = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&state.db)
            .await
        {
            gauge!(CATALOG_ROWS, "table" => table).set(count as f64);
        }
    }

    for kind in [CatalogKind::Planet, CatalogKind::People] {
        if let Ok(count) = Favorite::count(&state.db, kind).await {
            gauge!(FAVORITES_STORED, "kind" => kind.as_str()).set(count as f64);
        }
    }
}

/// Middleware to track HTTP request metrics.
///
/// Records:
/// - `http_requests_total` counter with method, path, and status labels
/// - `http_request_duration_seconds` histogram with method and path labels
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    // Use the matched route template (e.g. /planets/:id) to keep label cardinality bounded
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let method = request.method().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

pub fn record_favorite_added(kind: CatalogKind) {
    counter!(FAVORITES_ADDED_TOTAL, "kind" => kind.as_str()).increment(1);
}

pub fn record_favorite_removed(kind: CatalogKind) {
    counter!(FAVORITES_REMOVED_TOTAL, "kind" => kind.as_str()).increment(1);
}
