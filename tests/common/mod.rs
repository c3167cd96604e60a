use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use holonet::config::Config;
use holonet::{AppState, DbPool};

/// Router over a fresh in-memory database with a small catalog:
/// users 1 and 2, planets 5 (Hoth) and 6 (Dagobah), people 1 (Luke) and 2 (Yoda).
pub async fn test_app() -> (Router, DbPool) {
    let config = Config::default().with_overrides(None, Some("sqlite::memory:".to_string()));
    let db = holonet::db::init(&config.database).await.unwrap();

    seed(&db).await;

    let state = Arc::new(AppState::new(config, db.clone()));
    (holonet::api::create_router(state), db)
}

async fn seed(db: &DbPool) {
    for (id, email) in [(1, "luke@tatooine.net"), (2, "han@falcon.net")] {
        sqlx::query("INSERT INTO users (id, email, password, is_active) VALUES (?, ?, 'secret', 1)")
            .bind(id)
            .bind(email)
            .execute(db)
            .await
            .unwrap();
    }

    sqlx::query(
        "INSERT INTO planets (id, name, diameter, climate) VALUES \
         (5, 'Hoth', 7200, 'frozen'), (6, 'Dagobah', 8900, 'murky')",
    )
    .execute(db)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO people (id, name, height, mass, hair_color, skin_color, eye_color, birth_year) VALUES \
         (1, 'Luke Skywalker', 172, 77, 'blond', 'fair', 'blue', '19BBY'), \
         (2, 'Yoda', 66, 17, 'white', 'green', 'brown', '896BBY')",
    )
    .execute(db)
    .await
    .unwrap();
}

/// Send a body-less request and decode the JSON response (text bodies become a JSON string).
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, body)
}
