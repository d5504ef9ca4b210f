//! Playlist Backend Server
//!
//! Provides:
//! - Steam catalog and owned-apps sync into SQLite
//! - REST API over the owned library (list, single game, stats, favourites)
//! - Cached Steam proxy for the user's live status and recent games

mod cache;
mod config;
mod db;
mod retry;
mod routes;
mod steam_api;
mod sync;
#[cfg(test)]
mod test_support;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::db::Database;
use crate::retry::RetryPolicy;
use crate::steam_api::{SteamApi, SteamClient};

pub struct AppState {
    pub db: Database,
    pub steam: Arc<dyn SteamApi>,
    pub cache: ResponseCache,
    pub retry: RetryPolicy,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/", get(routes::alive))
        // Library views
        .route("/steam/games", get(routes::get_games))
        .route("/steam/game/{id}", get(routes::get_game))
        .route("/steam/game/{id}/favourite", get(routes::toggle_favourite))
        .route("/steam/stats", get(routes::get_stats))
        // Live Steam proxies
        .route("/steam/user/status", get(routes::get_user_status))
        .route("/steam/user/recent", get(routes::get_user_recent))
        // Owned apps
        .route("/steam/user/apps", get(routes::get_user_apps))
        .route("/steam/user/apps/refresh", get(routes::refresh_user_apps))
        // App catalog
        .route("/steam/apps/refresh", get(routes::refresh_apps))
        .route("/steam/apps/metadata", get(routes::get_apps_metadata))
        .with_state(state)
        .layer(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "playlist_backend=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db = match Database::open(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(path = %config.database_path.display(), "Failed to open database: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(path = %config.database_path.display(), "Opened database");

    let state = Arc::new(AppState {
        db,
        steam: Arc::new(SteamClient::from_config(&config)),
        cache: ResponseCache::new(config.cache),
        retry: config.retry,
    });

    // Blocks until Steam hands back the owned-games list
    if let Err(e) = sync::boot_sync(state.steam.as_ref(), &state.db, &state.retry).await {
        tracing::error!("Startup sync failed, serving existing data: {}", e);
    }

    tracing::info!("Starting server on {}", config.bind_address);

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_address, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
