use axum::{extract::State, Json};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{User, UserListResponse, UserResponse};
use crate::AppState;

/// List all users (id and email only)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = User::list_all(&state.db).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}
