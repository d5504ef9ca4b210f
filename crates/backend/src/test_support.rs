//! Router fixtures shared by the route tests

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use playlist_core::{CatalogEntry, OwnedGames, SteamGame};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use crate::cache::ResponseCache;
use crate::db::{self, Database};
use crate::retry::RetryPolicy;
use crate::steam_api::{SteamApi, SteamApiError};
use crate::AppState;

/// Scripted Steam: proxy answers are consumed in order, the rest repeat
#[derive(Default)]
pub struct FakeSteam {
    owned: Vec<SteamGame>,
    catalog: Vec<CatalogEntry>,
    catalog_error: Mutex<Option<SteamApiError>>,
    player: Mutex<VecDeque<Result<Value, SteamApiError>>>,
    recent: Mutex<VecDeque<Result<Value, SteamApiError>>>,
}

impl FakeSteam {
    pub fn with_owned(mut self, games: &[(u64, &str, u32)]) -> Self {
        self.owned = games.iter().map(owned_game).collect();
        self
    }

    pub fn with_catalog(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.catalog = entries;
        self
    }

    pub fn with_catalog_error(self, error: SteamApiError) -> Self {
        *self.catalog_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_player(self, answer: Result<Value, SteamApiError>) -> Self {
        self.player.lock().unwrap().push_back(answer);
        self
    }

    pub fn with_recent(self, answer: Result<Value, SteamApiError>) -> Self {
        self.recent.lock().unwrap().push_back(answer);
        self
    }
}

#[async_trait]
impl SteamApi for FakeSteam {
    async fn owned_games(&self) -> Result<OwnedGames, SteamApiError> {
        Ok(OwnedGames {
            game_count: self.owned.len() as u32,
            games: self.owned.clone(),
        })
    }

    async fn app_list(&self) -> Result<Vec<CatalogEntry>, SteamApiError> {
        match self.catalog_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(self.catalog.clone()),
        }
    }

    async fn player_summary(&self) -> Result<Value, SteamApiError> {
        self.player
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SteamApiError::MissingField("players[0]")))
    }

    async fn recently_played(&self) -> Result<Value, SteamApiError> {
        self.recent
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SteamApiError::MissingField("response")))
    }
}

pub fn status_error(status: StatusCode) -> SteamApiError {
    SteamApiError::Status {
        status,
        body: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

/// `(appid, name, playtime_forever)`; played games get a last-played time
pub fn owned_game(&(appid, name, minutes): &(u64, &str, u32)) -> SteamGame {
    SteamGame {
        appid,
        name: Some(name.to_string()),
        playtime_forever: minutes,
        playtime_windows_forever: minutes,
        playtime_mac_forever: 0,
        playtime_linux_forever: 0,
        playtime_deck_forever: 0,
        playtime_disconnected: 0,
        rtime_last_played: if minutes > 0 { 1_700_000_000 + appid as i64 } else { 0 },
    }
}

pub async fn test_app(games: &[(u64, &str, u32)]) -> (Router, Vec<i64>) {
    test_app_with(FakeSteam::default(), games).await
}

/// Router over an in-memory store seeded with one sync of `games`.
/// Returns the local ids of the seeded games in input order.
pub async fn test_app_with(steam: FakeSteam, games: &[(u64, &str, u32)]) -> (Router, Vec<i64>) {
    let db = Database::open_in_memory().unwrap();
    let ids = {
        let mut conn = db.lock().await;
        let owned: Vec<SteamGame> = games.iter().map(owned_game).collect();
        crate::sync::store_owned_games(&mut conn, &owned, Utc::now()).unwrap();

        let apps = db::list_owned_apps(&conn).unwrap();
        games
            .iter()
            .map(|(appid, _, _)| apps.iter().find(|a| a.appid == *appid).unwrap().id)
            .collect()
    };

    let state = Arc::new(AppState {
        db,
        steam: Arc::new(steam),
        cache: ResponseCache::default(),
        retry: RetryPolicy::bounded(Duration::from_millis(1), 1),
    });
    (crate::app(state), ids)
}

/// Issue a GET and decode the JSON body (`Null` when empty)
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
