//! App catalog route handlers

use axum::{extract::State, http::StatusCode, Json};
use playlist_core::{CatalogMetadata, CatalogSyncReport};
use std::sync::Arc;

use super::{db_error, error_response, sync_error, ApiError};
use crate::AppState;

/// Re-fetch the full catalog; existing apps are skipped
/// GET /steam/apps/refresh
pub async fn refresh_apps(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogSyncReport>, ApiError> {
    crate::sync::sync_catalog(state.steam.as_ref(), &state.db)
        .await
        .map(Json)
        .map_err(sync_error)
}

/// Size and time of the most recent catalog sync
/// GET /steam/apps/metadata
pub async fn get_apps_metadata(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogMetadata>, ApiError> {
    let conn = state.db.lock().await;
    match crate::db::latest_catalog_metadata(&conn).map_err(db_error)? {
        Some(metadata) => Ok(Json(metadata)),
        None => Err(error_response(StatusCode::NOT_FOUND, "Catalog has not been synced yet.")),
    }
}
