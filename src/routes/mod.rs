pub mod catalog;
pub mod posts;
pub mod uploads;
pub mod users;

use std::collections::HashMap;

use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(users::router())
        .merge(posts::router())
        .merge(catalog::router())
        .merge(uploads::router())
}

async fn index() -> &'static str {
    "plaza is running"
}

/// Presence validation: the field must exist and be non-empty after
/// trimming. Anything deeper is out of scope.
pub(crate) fn require_field<'a>(
    fields: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, AppError> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
}
