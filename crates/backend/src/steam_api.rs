//! Steam Web API client
//!
//! The `SteamApi` trait is the seam the synchronizers and proxy routes use,
//! `SteamClient` is the reqwest implementation.

use async_trait::async_trait;
use playlist_core::{CatalogEntry, OwnedGames};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;

pub const DEFAULT_API_BASE_URL: &str = "https://api.steampowered.com";

const PATH_OWNED_GAMES: &str = "/IPlayerService/GetOwnedGames/v0001/";
const PATH_APP_LIST: &str = "/ISteamApps/GetAppList/v2/";
const PATH_PLAYER_SUMMARIES: &str = "/ISteamUser/GetPlayerSummaries/v0002/";
const PATH_RECENTLY_PLAYED: &str = "/IPlayerService/GetRecentlyPlayedGames/v0001/";

#[derive(Debug, thiserror::Error)]
pub enum SteamApiError {
    /// Non-2xx answer from Steam
    #[error("Steam returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Failed to parse Steam response: {0}")]
    Decode(String),
    #[error("Steam response is missing `{0}`")]
    MissingField(&'static str),
}

impl SteamApiError {
    /// Upstream status code, if Steam answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SteamApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }

    /// Anything short of a 200 with a readable body is worth asking again
    pub fn is_retryable(&self) -> bool {
        matches!(self, SteamApiError::Status { .. } | SteamApiError::Transport(_))
    }
}

#[async_trait]
pub trait SteamApi: Send + Sync {
    /// `response` of GetOwnedGames for the configured user
    async fn owned_games(&self) -> Result<OwnedGames, SteamApiError>;

    /// Full platform app catalog
    async fn app_list(&self) -> Result<Vec<CatalogEntry>, SteamApiError>;

    /// First player object of GetPlayerSummaries
    async fn player_summary(&self) -> Result<Value, SteamApiError>;

    /// `response` of GetRecentlyPlayedGames
    async fn recently_played(&self) -> Result<Value, SteamApiError>;
}

pub struct SteamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    steam_id: String,
}

impl SteamClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, steam_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            steam_id: steam_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.steam_api_base_url, &config.steam_api_key, &config.steam_user_id)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, SteamApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(SteamApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, path, "Steam API request failed");
            return Err(SteamApiError::Status { status, body });
        }

        let body = response.text().await.map_err(SteamApiError::Transport)?;
        serde_json::from_str(&body).map_err(|e| SteamApiError::Decode(e.to_string()))
    }
}

fn take_field(mut value: Value, field: &'static str) -> Result<Value, SteamApiError> {
    match value.get_mut(field) {
        Some(inner) => Ok(inner.take()),
        None => Err(SteamApiError::MissingField(field)),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, SteamApiError> {
    serde_json::from_value(value).map_err(|e| SteamApiError::Decode(e.to_string()))
}

#[async_trait]
impl SteamApi for SteamClient {
    async fn owned_games(&self) -> Result<OwnedGames, SteamApiError> {
        let body = self
            .get_json(
                PATH_OWNED_GAMES,
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", self.steam_id.as_str()),
                    ("include_appinfo", "1"),
                    ("include_played_free_games", "1"),
                    ("format", "json"),
                ],
            )
            .await?;
        decode(take_field(body, "response")?)
    }

    async fn app_list(&self) -> Result<Vec<CatalogEntry>, SteamApiError> {
        let body = self.get_json(PATH_APP_LIST, &[]).await?;
        let apps = take_field(take_field(body, "applist")?, "apps")?;
        decode(apps)
    }

    async fn player_summary(&self) -> Result<Value, SteamApiError> {
        let body = self
            .get_json(
                PATH_PLAYER_SUMMARIES,
                &[("key", self.api_key.as_str()), ("steamids", self.steam_id.as_str())],
            )
            .await?;
        let players = take_field(take_field(body, "response")?, "players")?;
        match players {
            Value::Array(mut players) if !players.is_empty() => Ok(players.swap_remove(0)),
            _ => Err(SteamApiError::MissingField("players[0]")),
        }
    }

    async fn recently_played(&self) -> Result<Value, SteamApiError> {
        let body = self
            .get_json(
                PATH_RECENTLY_PLAYED,
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", self.steam_id.as_str()),
                    ("format", "json"),
                ],
            )
            .await?;
        take_field(body, "response")
    }
}
