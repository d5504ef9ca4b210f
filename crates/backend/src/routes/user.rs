//! Steam user route handlers: live proxies and the owned-apps resync

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use playlist_core::OwnedAppSummary;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;

use super::{db_error, steam_error, sync_error, ApiError};
use crate::steam_api::SteamApiError;
use crate::AppState;

const STATUS_KEY: &str = "/steam/user/status";
const RECENT_KEY: &str = "/steam/user/recent";

/// Forward a live Steam call, remembering the last good payload under `key`.
/// A 429 answers from that memory (200) or with 204 if there is none.
async fn proxy_with_cache(
    state: &AppState,
    key: &str,
    fetch: impl Future<Output = Result<Value, SteamApiError>>,
) -> Result<Response, ApiError> {
    match fetch.await {
        Ok(value) => {
            state.cache.set(key, value.clone());
            Ok(Json(value).into_response())
        }
        Err(e) if e.is_rate_limited() => match state.cache.get(key) {
            Some(cached) => {
                tracing::info!(key, "Steam rate limited, serving cached response");
                Ok(Json(cached).into_response())
            }
            None => {
                tracing::warn!(key, "Steam rate limited and nothing cached");
                Ok(StatusCode::NO_CONTENT.into_response())
            }
        },
        Err(e) => {
            tracing::warn!(key, "Steam proxy request failed: {}", e);
            Err(steam_error(e))
        }
    }
}

/// Player summary of the configured user
/// GET /steam/user/status
pub async fn get_user_status(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    proxy_with_cache(&state, STATUS_KEY, state.steam.player_summary()).await
}

/// Games played in the last two weeks
/// GET /steam/user/recent
pub async fn get_user_recent(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    proxy_with_cache(&state, RECENT_KEY, state.steam.recently_played()).await
}

/// Every owned app with its highest recorded playtime
/// GET /steam/user/apps
pub async fn get_user_apps(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OwnedAppSummary>>, ApiError> {
    let conn = state.db.lock().await;
    crate::db::list_owned_apps(&conn).map(Json).map_err(db_error)
}

/// Re-run the owned-apps sync; blocks while Steam keeps failing
/// GET /steam/user/apps/refresh
pub async fn refresh_user_apps(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let report = crate::sync::sync_owned_apps(state.steam.as_ref(), &state.db, &state.retry)
        .await
        .map_err(sync_error)?;

    Ok(Json(json!({
        "message": "Triggered DB refresh",
        "report": report,
    })))
}
