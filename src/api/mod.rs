mod catalog;
pub mod error;
pub mod extract;
mod favorites;
pub mod metrics;
mod users;
pub mod validation;

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::CorsConfig;
use crate::AppState;

/// Every public route, served by the sitemap at `/`
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("GET", "/metrics"),
    ("GET", "/people"),
    ("GET", "/peoples/:id"),
    ("GET", "/planets"),
    ("GET", "/planets/:id"),
    ("GET", "/users"),
    ("GET", "/users/favorites"),
    ("POST", "/favorite/planet/:id"),
    ("DELETE", "/favorite/planet/:id"),
    ("POST", "/favorite/people/:id"),
    ("DELETE", "/favorite/people/:id"),
];

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/", get(sitemap))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_endpoint))
        // Catalog
        .route("/people", get(catalog::list_people))
        .route("/peoples/:id", get(catalog::get_person))
        .route("/planets", get(catalog::list_planets))
        .route("/planets/:id", get(catalog::get_planet))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/favorites", get(favorites::list_user_favorites))
        // Favorites
        .route(
            "/favorite/:kind/:id",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .layer(middleware::from_fn(metrics::metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS policy. With no configured origins any origin is allowed.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[derive(Debug, Serialize)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SitemapResponse {
    pub endpoints: Vec<Endpoint>,
}

/// GET / - lists every route the API serves
async fn sitemap() -> Json<SitemapResponse> {
    let endpoints = ENDPOINTS
        .iter()
        .map(|&(method, path)| Endpoint { method, path })
        .collect();

    Json(SitemapResponse { endpoints })
}

/// GET /health - database health report, 503 when a critical check fails
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = crate::startup::check_database(&state.db).await;

    let status = if health.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
