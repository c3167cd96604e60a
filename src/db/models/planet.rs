//! Planet catalog models.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Planet {
    pub id: i64,
    pub name: String,
    pub diameter: Option<i64>,
    pub climate: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanetListResponse {
    pub planets: Vec<Planet>,
}

#[derive(Debug, Serialize)]
pub struct PlanetResponse {
    pub planet: Planet,
}

impl Planet {
    pub async fn list_all(db: &SqlitePool) -> Result<Vec<Planet>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, diameter, climate FROM planets ORDER BY id ASC")
            .fetch_all(db)
            .await
    }

    pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<Planet>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, diameter, climate FROM planets WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }
}
