//! Environment configuration
//!
//! Read once at boot, after `dotenvy` has loaded any `.env` file.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{ResponseCacheConfig, DEFAULT_CACHE_MAX_CAPACITY, DEFAULT_CACHE_TTL};
use crate::retry::{RetryPolicy, DEFAULT_RETRY_DELAY};
use crate::steam_api::DEFAULT_API_BASE_URL;

const DEFAULT_DATABASE_PATH: &str = "data/database.db";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub steam_api_key: String,
    pub steam_user_id: String,
    pub database_path: PathBuf,
    pub bind_address: String,
    pub steam_api_base_url: String,
    pub cache: ResponseCacheConfig,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let steam_api_key = required("STEAM_API_KEY")?;
        let steam_user_id = required("STEAM_USER_ID")?;

        let cache = ResponseCacheConfig {
            max_capacity: parse_or(&get, "CACHE_MAX_CAPACITY", DEFAULT_CACHE_MAX_CAPACITY)?,
            ttl: Duration::from_secs(parse_or(&get, "CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL.as_secs())?),
        };

        let delay = Duration::from_secs(parse_or(
            &get,
            "SYNC_RETRY_DELAY_SECONDS",
            DEFAULT_RETRY_DELAY.as_secs(),
        )?);
        let retry = match parse_opt::<u32>(&get, "SYNC_RETRY_MAX_ATTEMPTS")? {
            Some(max) => RetryPolicy::bounded(delay, max),
            None => RetryPolicy::forever(delay),
        };

        Ok(Self {
            steam_api_key,
            steam_user_id,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            steam_api_base_url: get("STEAM_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            cache,
            retry,
        })
    }
}

fn parse_opt<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    Ok(parse_opt(get, name)?.unwrap_or(default))
}
