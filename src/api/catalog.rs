//! Catalog endpoints: people and planets, read-only.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::error::ApiError;
use super::extract::IdPath;
use crate::db::{
    PeopleListResponse, Person, PersonResponse, Planet, PlanetListResponse, PlanetResponse,
};
use crate::AppState;

/// List all people
///
/// GET /people
pub async fn list_people(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PeopleListResponse>, ApiError> {
    let peoples = Person::list_all(&state.db).await?;
    Ok(Json(PeopleListResponse { peoples }))
}

/// Get a single person by ID
///
/// GET /peoples/:id
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<PersonResponse>, ApiError> {
    let person = Person::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Person not found!"))?;

    Ok(Json(PersonResponse { person }))
}

/// List all planets
///
/// GET /planets
pub async fn list_planets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlanetListResponse>, ApiError> {
    let planets = Planet::list_all(&state.db).await?;
    Ok(Json(PlanetListResponse { planets }))
}

/// Get a single planet by ID
///
/// GET /planets/:id
pub async fn get_planet(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath<i64>,
) -> Result<Json<PlanetResponse>, ApiError> {
    let planet = Planet::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Planet not found!"))?;

    Ok(Json(PlanetResponse { planet }))
}
