//! People catalog models.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A row of the `people` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub height: Option<i64>,
    pub mass: Option<i64>,
    pub hair_color: Option<String>,
    pub skin_color: Option<String>,
    pub eye_color: Option<String>,
    pub birth_year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PeopleListResponse {
    pub peoples: Vec<Person>,
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub person: Person,
}

const PERSON_COLUMNS: &str =
    "id, name, height, mass, hair_color, skin_color, eye_color, birth_year";

impl Person {
    pub async fn list_all(db: &SqlitePool) -> Result<Vec<Person>, sqlx::Error> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY id ASC");
        sqlx::query_as(&sql).fetch_all(db).await
    }

    pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<Person>, sqlx::Error> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }
}
