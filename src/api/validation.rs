//! Input validation for API requests.
//!
//! Only presence checks and integer parsing of identifiers; request bodies are
//! not accepted anywhere.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use super::error::ApiError;

/// Query string carrying the acting user, e.g. `?user_id=1`
///
/// Unrelated parameters are ignored and a repeated `user_id` resolves to its
/// first value. Presence and format are checked by
/// [`UserQuery::require_user_id`].
#[derive(Debug, Default)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for UserQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state).await?;

        let user_id = pairs
            .into_iter()
            .find(|(key, _)| key == "user_id")
            .map(|(_, value)| value);

        Ok(Self { user_id })
    }
}

impl UserQuery {
    pub fn require_user_id(&self) -> Result<i64, ApiError> {
        validate_user_id(self.user_id.as_deref()).map_err(|e| match e {
            UserIdError::Missing => ApiError::missing_parameter(e.message()),
            UserIdError::NotAnInteger => ApiError::bad_request(e.message()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIdError {
    Missing,
    NotAnInteger,
}

impl UserIdError {
    pub fn message(&self) -> &'static str {
        match self {
            UserIdError::Missing => "User ID is required!",
            UserIdError::NotAnInteger => "User ID must be an integer",
        }
    }
}

/// Validate a raw `user_id` query value
pub fn validate_user_id(raw: Option<&str>) -> Result<i64, UserIdError> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Err(UserIdError::Missing),
        Some(value) => value,
    };

    value.parse::<i64>().map_err(|_| UserIdError::NotAnInteger)
}
