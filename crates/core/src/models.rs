//! Row types for the local store and payload types for the Steam Web API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the platform-wide app catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogApp {
    pub appid: u64,
    pub name: String,
}

/// Snapshot of the catalog size, one row per catalog sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub size: i64,
    pub timestamp: DateTime<Utc>,
}

/// An app the configured user owns, with the user-set flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedApp {
    /// Local row id, used by the single-game and favourite routes
    pub id: i64,
    pub appid: u64,
    pub now_playing: bool,
    pub favourite: bool,
}

/// Playtime fields as reported by one owned-games fetch (minutes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playtime {
    pub playtime_forever: u32,
    pub playtime_windows: u32,
    pub playtime_mac: u32,
    pub playtime_linux: u32,
    pub playtime_deck: u32,
    pub playtime_disconnected: u32,
    /// Unix time of the last session, 0 if never played
    pub last_played: i64,
}

/// One appended playtime snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaytimeRecord {
    pub appid: u64,
    #[serde(flatten)]
    pub playtime: Playtime,
    /// When the sync that produced this row ran
    pub timestamp: DateTime<Utc>,
}

/// OwnedApp joined with its catalog name and one playtime record
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub id: i64,
    pub appid: u64,
    pub name: String,
    pub now_playing: bool,
    pub favourite: bool,
    pub playtime: Playtime,
    pub timestamp: DateTime<Utc>,
}

/// Owned app with the largest playtime ever recorded for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedAppSummary {
    pub id: i64,
    pub appid: u64,
    pub name: String,
    pub now_playing: bool,
    pub favourite: bool,
    pub playtime_forever: Option<u32>,
}

// ============================================================================
// Steam Web API payloads
// ============================================================================

/// Entry of `ISteamApps/GetAppList`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub appid: u64,
    #[serde(default)]
    pub name: String,
}

/// Entry of `IPlayerService/GetOwnedGames`
///
/// Steam omits the per-platform counters for some apps, so everything but
/// the appid defaults to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamGame {
    pub appid: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub playtime_forever: u32,
    #[serde(default)]
    pub playtime_windows_forever: u32,
    #[serde(default)]
    pub playtime_mac_forever: u32,
    #[serde(default)]
    pub playtime_linux_forever: u32,
    #[serde(default)]
    pub playtime_deck_forever: u32,
    #[serde(default)]
    pub playtime_disconnected: u32,
    #[serde(default)]
    pub rtime_last_played: i64,
}

impl SteamGame {
    pub fn playtime(&self) -> Playtime {
        Playtime {
            playtime_forever: self.playtime_forever,
            playtime_windows: self.playtime_windows_forever,
            playtime_mac: self.playtime_mac_forever,
            playtime_linux: self.playtime_linux_forever,
            playtime_deck: self.playtime_deck_forever,
            playtime_disconnected: self.playtime_disconnected,
            last_played: self.rtime_last_played,
        }
    }

    /// Name carried by the owned-games payload, if non-empty
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// `response` object of `IPlayerService/GetOwnedGames`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedGames {
    #[serde(default)]
    pub game_count: u32,
    #[serde(default)]
    pub games: Vec<SteamGame>,
}

// ============================================================================
// Sync reports
// ============================================================================

/// Outcome of a catalog sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSyncReport {
    /// Entries returned by the remote catalog
    pub received: usize,
    pub inserted: usize,
    pub skipped_unnamed: usize,
    /// Entries already present locally
    pub duplicates: usize,
    /// Catalog row count written to the metadata snapshot
    pub size: i64,
}

/// Outcome of an owned-apps sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedSyncReport {
    pub game_count: usize,
    pub owned_inserted: usize,
    pub owned_existing: usize,
    pub playtime_appended: usize,
    /// Owned games with neither a catalog row nor a name to create one
    pub skipped_missing_catalog: usize,
}
