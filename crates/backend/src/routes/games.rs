//! Library view route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use playlist_core::{
    build_game_list, compute_stats, GameDetail, GameListParams, GameListQuery, GameSummary,
    LibraryStats, OwnedApp,
};
use std::sync::Arc;

use super::{db_error, error_response, ApiError, NO_DATA};
use crate::AppState;

/// Filtered, sorted list of owned games at their latest playtime record
/// GET /steam/games?sort=&order=&playedOnly&unplayedOnly&favouritesOnly
pub async fn get_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GameListParams>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let query = GameListQuery::from(params);
    let entries = {
        let conn = state.db.lock().await;
        crate::db::library_entries(&conn).map_err(db_error)?
    };

    let games = build_game_list(&entries, &query);
    if games.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, NO_DATA));
    }
    Ok(Json(games))
}

/// GET /steam/game/{id}
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<GameDetail>, ApiError> {
    let conn = state.db.lock().await;
    match crate::db::latest_library_entry(&conn, id).map_err(db_error)? {
        Some(entry) => Ok(Json(GameDetail::from(&entry))),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "No data found for the requested ID.",
        )),
    }
}

/// Flip the favourite flag and return the updated row
/// GET /steam/game/{id}/favourite
pub async fn toggle_favourite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OwnedApp>, ApiError> {
    let conn = state.db.lock().await;
    match crate::db::toggle_favourite(&conn, id).map_err(db_error)? {
        Some(app) => {
            tracing::info!(id, appid = app.appid, favourite = app.favourite, "Favourite toggled");
            Ok(Json(app))
        }
        None => Err(error_response(StatusCode::NOT_FOUND, NO_DATA)),
    }
}

/// GET /steam/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LibraryStats>, ApiError> {
    let entries = {
        let conn = state.db.lock().await;
        crate::db::library_entries(&conn).map_err(db_error)?
    };

    compute_stats(&entries)
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, NO_DATA))
}
