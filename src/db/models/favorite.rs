//! Favorite models: the join tables linking users to catalog items.
//!
//! Planets and people share one implementation keyed by [`CatalogKind`].
//! Catalog names are resolved with a join at read time, never stored on the
//! favorite row, so a favorite whose catalog row has disappeared serializes
//! with a `null` name instead of failing.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const FAVORITE_PLANETS_UNIQUE_INDEX: &str = "idx_favorite_planets_user_planet";
pub const FAVORITE_PEOPLE_UNIQUE_INDEX: &str = "idx_favorite_people_user_people";

/// Kind of catalog item a favorite points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Planet,
    People,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Planet => "planet",
            CatalogKind::People => "people",
        }
    }

    fn favorites_table(&self) -> &'static str {
        match self {
            CatalogKind::Planet => "favorite_planets",
            CatalogKind::People => "favorite_people",
        }
    }

    fn item_column(&self) -> &'static str {
        match self {
            CatalogKind::Planet => "planet_id",
            CatalogKind::People => "people_id",
        }
    }

    fn catalog_table(&self) -> &'static str {
        match self {
            CatalogKind::Planet => "planets",
            CatalogKind::People => "people",
        }
    }

    pub fn unique_index(&self) -> &'static str {
        match self {
            CatalogKind::Planet => FAVORITE_PLANETS_UNIQUE_INDEX,
            CatalogKind::People => FAVORITE_PEOPLE_UNIQUE_INDEX,
        }
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planet" => Ok(CatalogKind::Planet),
            "people" => Ok(CatalogKind::People),
            other => Err(format!("Unknown catalog kind: {other}")),
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Favorite row joined with the name of the catalog item it references
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub item_id: i64,
    pub item_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritePlanetResponse {
    pub planet_id: i64,
    pub planet_name: Option<String>,
}

impl From<Favorite> for FavoritePlanetResponse {
    fn from(favorite: Favorite) -> Self {
        Self {
            planet_id: favorite.item_id,
            planet_name: favorite.item_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritePeopleResponse {
    pub people_id: i64,
    pub people_name: Option<String>,
}

impl From<Favorite> for FavoritePeopleResponse {
    fn from(favorite: Favorite) -> Self {
        Self {
            people_id: favorite.item_id,
            people_name: favorite.item_name,
        }
    }
}

/// A single favorite, serialized in the shape of its kind
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FavoriteResponse {
    Planet(FavoritePlanetResponse),
    People(FavoritePeopleResponse),
}

impl FavoriteResponse {
    pub fn new(kind: CatalogKind, favorite: Favorite) -> Self {
        match kind {
            CatalogKind::Planet => FavoriteResponse::Planet(favorite.into()),
            CatalogKind::People => FavoriteResponse::People(favorite.into()),
        }
    }
}

/// All favorites of one user
#[derive(Debug, Clone, Serialize)]
pub struct UserFavoritesResponse {
    pub favorites_planets: Vec<FavoritePlanetResponse>,
    pub favorites_people: Vec<FavoritePeopleResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Errors from favorite mutations
#[derive(Error, Debug)]
pub enum FavoriteError {
    #[error("Favorite already exists!")]
    AlreadyExists,

    #[error("Favorite not found!")]
    NotFound,

    #[error("Referenced resource does not exist")]
    UnknownReference,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Map insert failures raised by table constraints onto favorite errors.
fn classify_insert_error(err: sqlx::Error) -> FavoriteError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return FavoriteError::AlreadyExists;
        }
        if db_err.is_foreign_key_violation() {
            return FavoriteError::UnknownReference;
        }
    }
    FavoriteError::Database(err)
}

fn select_sql(kind: CatalogKind, filter: &str) -> String {
    format!(
        r#"
        SELECT f.id, f.user_id, f.{item} AS item_id, c.name AS item_name
        FROM {favorites} f
        LEFT JOIN {catalog} c ON c.id = f.{item}
        WHERE {filter}
        ORDER BY f.id ASC
        "#,
        item = kind.item_column(),
        favorites = kind.favorites_table(),
        catalog = kind.catalog_table(),
    )
}

impl Favorite {
    /// Favorites of `user_id` for one catalog kind, oldest first
    pub async fn list_for_user(
        db: &SqlitePool,
        kind: CatalogKind,
        user_id: i64,
    ) -> Result<Vec<Favorite>, sqlx::Error> {
        let sql = select_sql(kind, "f.user_id = ?");
        sqlx::query_as(&sql).bind(user_id).fetch_all(db).await
    }

    /// Find the favorite linking `user_id` to `item_id`
    pub async fn find(
        db: &SqlitePool,
        kind: CatalogKind,
        user_id: i64,
        item_id: i64,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        let sql = select_sql(kind, &format!("f.user_id = ? AND f.{} = ?", kind.item_column()));
        sqlx::query_as(&sql)
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(db)
            .await
    }

    async fn get_by_id(
        db: &SqlitePool,
        kind: CatalogKind,
        id: i64,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        let sql = select_sql(kind, "f.id = ?");
        sqlx::query_as(&sql).bind(id).fetch_optional(db).await
    }

    /// Add a favorite, refusing a second row for the same (user, item) pair.
    pub async fn add(
        db: &SqlitePool,
        kind: CatalogKind,
        user_id: i64,
        item_id: i64,
    ) -> Result<Favorite, FavoriteError> {
        if Self::find(db, kind, user_id, item_id).await?.is_some() {
            debug!(kind = %kind, user_id, item_id, "Favorite already present");
            return Err(FavoriteError::AlreadyExists);
        }

        // Two concurrent requests can both pass the lookup above; the unique
        // index turns the second insert into AlreadyExists.
        let sql = format!(
            "INSERT INTO {} (user_id, {}) VALUES (?, ?)",
            kind.favorites_table(),
            kind.item_column()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(item_id)
            .execute(db)
            .await
            .map_err(classify_insert_error)?;

        Self::get_by_id(db, kind, result.last_insert_rowid())
            .await?
            .ok_or(FavoriteError::Database(sqlx::Error::RowNotFound))
    }

    /// Remove the favorite linking `user_id` to `item_id`.
    pub async fn remove(
        db: &SqlitePool,
        kind: CatalogKind,
        user_id: i64,
        item_id: i64,
    ) -> Result<(), FavoriteError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = ? AND {} = ?",
            kind.favorites_table(),
            kind.item_column()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(item_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FavoriteError::NotFound);
        }

        Ok(())
    }

    /// Both favorite lists of a user, serialized for the API
    pub async fn all_for_user(
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<UserFavoritesResponse, sqlx::Error> {
        let planets = Self::list_for_user(db, CatalogKind::Planet, user_id).await?;
        let people = Self::list_for_user(db, CatalogKind::People, user_id).await?;

        Ok(UserFavoritesResponse {
            favorites_planets: planets.into_iter().map(Into::into).collect(),
            favorites_people: people.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn count(db: &SqlitePool, kind: CatalogKind) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.favorites_table());
        sqlx::query_scalar::<_, i64>(&sql).fetch_one(db).await
    }
}
