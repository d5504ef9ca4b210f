//! Read views over the owned library: game list, single game, stats
//!
//! Every builder here expects its entries in the order the store scans them:
//! newest playtime record first. The first entry seen for an appid is its
//! latest record and is the only one that counts.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LibraryEntry;
use crate::query::{GameListQuery, SortColumn, SortOrder};

const HEADER_IMAGE_URL: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps";

/// Row of the list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: i64,
    pub appid: u64,
    pub name: String,
    pub playtime_forever: u32,
    /// `dd/mm/YYYY`
    pub last_played: String,
    pub unplayed: bool,
    pub now_playing: bool,
    pub favourite: bool,
    pub img: String,
    #[serde(skip)]
    last_played_unix: i64,
}

impl From<&LibraryEntry> for GameSummary {
    fn from(entry: &LibraryEntry) -> Self {
        Self {
            id: entry.id,
            appid: entry.appid,
            name: entry.name.clone(),
            playtime_forever: entry.playtime.playtime_forever,
            last_played: format_date(entry.playtime.last_played),
            unplayed: entry.playtime.playtime_forever == 0,
            now_playing: entry.now_playing,
            favourite: entry.favourite,
            img: header_image_url(entry.appid),
            last_played_unix: entry.playtime.last_played,
        }
    }
}

/// Single-game view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    pub id: i64,
    pub appid: u64,
    pub name: String,
    /// Hours, one decimal
    pub playtime: f64,
    pub playtime_forever: u32,
    pub unplayed: bool,
    pub now_playing: bool,
    pub favourite: bool,
    pub last_played: String,
    pub img: String,
    /// `HH:MM (dd/mm/YYYY)` of the sync that produced the record
    pub timestamp: String,
}

impl From<&LibraryEntry> for GameDetail {
    fn from(entry: &LibraryEntry) -> Self {
        Self {
            id: entry.id,
            appid: entry.appid,
            name: entry.name.clone(),
            playtime: playtime_hours(entry.playtime.playtime_forever),
            playtime_forever: entry.playtime.playtime_forever,
            unplayed: entry.playtime.playtime_forever == 0,
            now_playing: entry.now_playing,
            favourite: entry.favourite,
            last_played: format_date(entry.playtime.last_played),
            img: header_image_url(entry.appid),
            timestamp: format_timestamp(&entry.timestamp),
        }
    }
}

/// Library-wide totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub count: usize,
    /// Minutes
    pub playtime: u64,
    pub unplayed: usize,
    /// `"{name} ({dd/mm/YYYY})"` of the most recently played game
    pub last_played: Option<String>,
    pub now_playing: usize,
    pub favourites: usize,
}

/// Keep the first (newest) entry of every appid, preserving scan order
pub fn latest_per_app(entries: &[LibraryEntry]) -> Vec<&LibraryEntry> {
    let mut seen = HashSet::new();
    entries.iter().filter(|e| seen.insert(e.appid)).collect()
}

/// Build the filtered and sorted list view
pub fn build_game_list(entries: &[LibraryEntry], query: &GameListQuery) -> Vec<GameSummary> {
    let mut games: Vec<GameSummary> = latest_per_app(entries)
        .into_iter()
        .filter(|e| query.play.matches(e.playtime.playtime_forever))
        .filter(|e| !query.favourites_only || e.favourite)
        .map(GameSummary::from)
        .collect();

    sort_games(&mut games, query.sort, query.order);
    games
}

/// Sort games in place, stable within equal keys
pub fn sort_games(games: &mut [GameSummary], column: SortColumn, order: SortOrder) {
    match column {
        SortColumn::Name => {
            games.sort_by(|a, b| {
                let cmp = a.name.to_lowercase().cmp(&b.name.to_lowercase());
                if order == SortOrder::Descending { cmp.reverse() } else { cmp }
            });
        }
        SortColumn::LastPlayed => {
            games.sort_by(|a, b| {
                let cmp = a.last_played_unix.cmp(&b.last_played_unix);
                if order == SortOrder::Descending { cmp.reverse() } else { cmp }
            });
        }
        SortColumn::Playtime => {
            games.sort_by(|a, b| {
                let cmp = a.playtime_forever.cmp(&b.playtime_forever);
                if order == SortOrder::Descending { cmp.reverse() } else { cmp }
            });
        }
    }
}

/// Compute totals over every distinct appid. `None` when there is nothing owned.
pub fn compute_stats(entries: &[LibraryEntry]) -> Option<LibraryStats> {
    if entries.is_empty() {
        return None;
    }

    let mut stats = LibraryStats {
        count: 0,
        playtime: 0,
        unplayed: 0,
        last_played: None,
        now_playing: 0,
        favourites: 0,
    };
    let mut last_played_time = 0;
    let mut last_played_name: Option<&str> = None;

    for entry in latest_per_app(entries) {
        stats.count += 1;
        stats.playtime += u64::from(entry.playtime.playtime_forever);
        // strictly greater: an equal later-visited record does not replace the first
        if entry.playtime.last_played > last_played_time {
            last_played_time = entry.playtime.last_played;
            last_played_name = Some(&entry.name);
        }
        if entry.playtime.playtime_forever == 0 {
            stats.unplayed += 1;
        }
        if entry.now_playing {
            stats.now_playing += 1;
        }
        if entry.favourite {
            stats.favourites += 1;
        }
    }

    stats.last_played =
        last_played_name.map(|name| format!("{} ({})", name, format_date(last_played_time)));
    Some(stats)
}

pub fn header_image_url(appid: u64) -> String {
    format!("{}/{}/header.jpg", HEADER_IMAGE_URL, appid)
}

/// Minutes to hours, rounded to one decimal
pub fn playtime_hours(minutes: u32) -> f64 {
    (f64::from(minutes) / 60.0 * 10.0).round() / 10.0
}

/// Unix time as `dd/mm/YYYY` (UTC)
pub fn format_date(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .format("%d/%m/%Y")
        .to_string()
}

/// Sync time as `HH:MM (dd/mm/YYYY)` (UTC)
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M (%d/%m/%Y)").to_string()
}
