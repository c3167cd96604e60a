//! Favorite endpoints.
//!
//! Every route identifies the acting user with the `user_id` query parameter.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use super::extract::IdPath;
use super::metrics::{record_favorite_added, record_favorite_removed};
use super::validation::UserQuery;
use crate::db::{CatalogKind, Favorite, FavoriteResponse, MessageResponse, UserFavoritesResponse};
use crate::AppState;

fn parse_kind(kind: &str) -> Result<CatalogKind, ApiError> {
    kind.parse().map_err(ApiError::not_found)
}

/// List the favorite planets and people of a user
///
/// GET /users/favorites?user_id=
pub async fn list_user_favorites(
    State(state): State<Arc<AppState>>,
    query: UserQuery,
) -> Result<Json<UserFavoritesResponse>, ApiError> {
    let user_id = query.require_user_id()?;

    let favorites = Favorite::all_for_user(&state.db, user_id).await?;
    Ok(Json(favorites))
}

/// Add a planet or person to a user's favorites
///
/// POST /favorite/:kind/:id?user_id=
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    IdPath((kind, item_id)): IdPath<(String, i64)>,
    query: UserQuery,
) -> Result<(StatusCode, Json<FavoriteResponse>), ApiError> {
    let kind = parse_kind(&kind)?;
    let user_id = query.require_user_id()?;

    let favorite = Favorite::add(&state.db, kind, user_id, item_id).await?;

    info!(kind = %kind, user_id, item_id, "Favorite added");
    record_favorite_added(kind);

    Ok((StatusCode::CREATED, Json(FavoriteResponse::new(kind, favorite))))
}

/// Remove a planet or person from a user's favorites
///
/// DELETE /favorite/:kind/:id?user_id=
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    IdPath((kind, item_id)): IdPath<(String, i64)>,
    query: UserQuery,
) -> Result<Json<MessageResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let user_id = query.require_user_id()?;

    Favorite::remove(&state.db, kind, user_id, item_id).await?;

    info!(kind = %kind, user_id, item_id, "Favorite removed");
    record_favorite_removed(kind);

    Ok(Json(MessageResponse {
        message: "Favorite deleted!".to_string(),
    }))
}
