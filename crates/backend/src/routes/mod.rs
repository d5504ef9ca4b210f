//! REST API routes

pub mod catalog;
pub mod games;
pub mod user;

// Re-export all route handlers
pub use catalog::*;
pub use games::*;
pub use user::*;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::DbError;
use crate::steam_api::SteamApiError;
use crate::sync::SyncError;

/// Error half of every handler result: status plus `{"error": "..."}`
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) const NO_DATA: &str = "No data available.";

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub(crate) fn db_error(e: DbError) -> ApiError {
    tracing::error!("Database error: {:?}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Upstream HTTP failures keep Steam's status, anything else is a 500
pub(crate) fn steam_error(e: SteamApiError) -> ApiError {
    match e {
        SteamApiError::Status { status, body } => error_response(status, body),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) fn sync_error(e: SyncError) -> ApiError {
    match e {
        SyncError::Steam(e) => steam_error(e),
        SyncError::Db(e) => db_error(e),
    }
}

/// Liveness probe
/// GET /
pub async fn alive() -> Json<Value> {
    Json(json!({ "message": "API is alive" }))
}
