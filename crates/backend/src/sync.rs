//! Catalog and owned-apps synchronizers
//!
//! Fetch from Steam, then reconcile into SQLite in one transaction per step.
//! Rows that already exist are skipped and counted, never fatal.

use chrono::{DateTime, Utc};
use playlist_core::{CatalogApp, CatalogEntry, CatalogSyncReport, OwnedSyncReport, SteamGame};
use rusqlite::Connection;

use crate::db::{self, Database, DbError, OwnedInsert};
use crate::retry::RetryPolicy;
use crate::steam_api::{SteamApi, SteamApiError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Steam(#[from] SteamApiError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Fetch the full app catalog and store every named entry, then append a
/// metadata snapshot with the resulting catalog size.
pub async fn sync_catalog(steam: &dyn SteamApi, db: &Database) -> Result<CatalogSyncReport, SyncError> {
    tracing::info!("Fetching Steam app catalog");
    let entries = steam.app_list().await?;

    let mut conn = db.lock().await;
    let report = store_catalog(&mut conn, entries, Utc::now())?;
    tracing::info!(
        received = report.received,
        inserted = report.inserted,
        skipped_unnamed = report.skipped_unnamed,
        duplicates = report.duplicates,
        size = report.size,
        "Catalog sync complete"
    );
    Ok(report)
}

pub fn store_catalog(
    conn: &mut Connection,
    entries: Vec<CatalogEntry>,
    now: DateTime<Utc>,
) -> Result<CatalogSyncReport, DbError> {
    let received = entries.len();
    let apps: Vec<CatalogApp> = entries
        .into_iter()
        .filter(|e| !e.name.is_empty())
        .map(|e| CatalogApp { appid: e.appid, name: e.name })
        .collect();
    let skipped_unnamed = received - apps.len();

    let outcome = db::insert_catalog_apps(conn, &apps)?;
    let size = db::catalog_size(conn)?;
    db::record_catalog_metadata(conn, size, now)?;

    Ok(CatalogSyncReport {
        received,
        inserted: outcome.inserted,
        skipped_unnamed,
        duplicates: outcome.duplicates,
        size,
    })
}

/// Fetch the owned-games list (retrying per `retry`) and record it: one
/// OwnedApp per game if absent, one new playtime record per game always.
pub async fn sync_owned_apps(
    steam: &dyn SteamApi,
    db: &Database,
    retry: &RetryPolicy,
) -> Result<OwnedSyncReport, SyncError> {
    tracing::info!("Fetching owned games");
    let owned = retry
        .run("Owned games fetch", || steam.owned_games(), SteamApiError::is_retryable)
        .await?;

    let mut conn = db.lock().await;
    let report = store_owned_games(&mut conn, &owned.games, Utc::now())?;
    tracing::info!(
        game_count = report.game_count,
        owned_inserted = report.owned_inserted,
        owned_existing = report.owned_existing,
        playtime_appended = report.playtime_appended,
        skipped_missing_catalog = report.skipped_missing_catalog,
        "Owned apps sync complete"
    );
    Ok(report)
}

/// Startup sync: fill the catalog if it has never been fetched, then record
/// the owned apps. A failed catalog fetch is not fatal, owned games carry
/// their own names.
pub async fn boot_sync(
    steam: &dyn SteamApi,
    db: &Database,
    retry: &RetryPolicy,
) -> Result<OwnedSyncReport, SyncError> {
    let catalog_empty = {
        let conn = db.lock().await;
        db::catalog_is_empty(&conn)?
    };

    if catalog_empty {
        if let Err(e) = sync_catalog(steam, db).await {
            tracing::error!("Catalog sync failed, continuing without it: {}", e);
        }
    } else {
        tracing::info!("Catalog already populated, skipping catalog sync");
    }

    sync_owned_apps(steam, db, retry).await
}

pub fn store_owned_games(
    conn: &mut Connection,
    games: &[SteamGame],
    now: DateTime<Utc>,
) -> Result<OwnedSyncReport, DbError> {
    let tx = conn.transaction()?;
    let mut report = OwnedSyncReport {
        game_count: games.len(),
        ..Default::default()
    };

    for game in games {
        if !db::catalog_contains(&tx, game.appid)? {
            // Catalog is stale or was never fetched; the owned-games payload carries the name
            match game.display_name() {
                Some(name) => {
                    let app = CatalogApp { appid: game.appid, name: name.to_string() };
                    db::insert_catalog_app_if_absent(&tx, &app)?;
                    tracing::debug!(appid = game.appid, name, "Backfilled catalog entry");
                }
                None => {
                    tracing::warn!(appid = game.appid, "Owned game missing from catalog, skipping");
                    report.skipped_missing_catalog += 1;
                    continue;
                }
            }
        }

        match db::insert_owned_app(&tx, game.appid)? {
            OwnedInsert::Inserted => report.owned_inserted += 1,
            OwnedInsert::Existing => report.owned_existing += 1,
        }

        db::append_playtime(&tx, game.appid, &game.playtime(), now)?;
        report.playtime_appended += 1;
    }

    tx.commit()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_conn;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use playlist_core::{OwnedGames, Playtime};
    use reqwest::StatusCode;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn entry(appid: u64, name: &str) -> CatalogEntry {
        CatalogEntry { appid, name: name.to_string() }
    }

    fn game(appid: u64, name: Option<&str>, forever: u32) -> SteamGame {
        SteamGame {
            appid,
            name: name.map(str::to_string),
            playtime_forever: forever,
            playtime_windows_forever: forever,
            playtime_mac_forever: 0,
            playtime_linux_forever: 0,
            playtime_deck_forever: 0,
            playtime_disconnected: 0,
            rtime_last_played: 1_700_000_000,
        }
    }

    #[test]
    fn catalog_skips_unnamed_and_snapshots_size() {
        let mut conn = memory_conn();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let report = store_catalog(
            &mut conn,
            vec![entry(10, "Counter-Strike"), entry(11, ""), entry(20, "Team Fortress")],
            now,
        )
        .unwrap();

        assert_eq!(report.received, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped_unnamed, 1);
        assert_eq!(report.size, 2);
        assert!(!db::catalog_contains(&conn, 11).unwrap());

        let metadata = db::latest_catalog_metadata(&conn).unwrap().unwrap();
        assert_eq!(metadata.size, 2);
        assert_eq!(metadata.timestamp, now);
    }

    #[test]
    fn catalog_rerun_swallows_duplicates_and_appends_metadata() {
        let mut conn = memory_conn();
        let now = Utc::now();
        store_catalog(&mut conn, vec![entry(10, "Counter-Strike")], now).unwrap();

        let report = store_catalog(&mut conn, vec![entry(10, "Counter-Strike"), entry(30, "Day of Defeat")], now).unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.size, 2);

        let snapshots: i64 = conn
            .query_row("SELECT COUNT(*) FROM steam_apps_metadata", [], |r| r.get(0))
            .unwrap();
        assert_eq!(snapshots, 2);
    }

    #[test]
    fn owned_resync_swallows_existing_and_still_appends_playtime() {
        let mut conn = memory_conn();
        store_catalog(&mut conn, vec![entry(10, "Counter-Strike")], Utc::now()).unwrap();

        let first = store_owned_games(&mut conn, &[game(10, None, 0)], Utc::now()).unwrap();
        assert_eq!(first.owned_inserted, 1);
        assert_eq!(first.playtime_appended, 1);

        let second = store_owned_games(&mut conn, &[game(10, None, 0)], Utc::now()).unwrap();
        assert_eq!(second.owned_inserted, 0);
        assert_eq!(second.owned_existing, 1);
        assert_eq!(second.playtime_appended, 1);
        assert_eq!(db::playtime_record_count(&conn, 10).unwrap(), 2);
    }

    #[test]
    fn owned_games_backfill_missing_catalog_entries() {
        let mut conn = memory_conn();

        let report = store_owned_games(
            &mut conn,
            &[game(10, Some("Counter-Strike"), 60), game(99, None, 5)],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(report.game_count, 2);
        assert_eq!(report.owned_inserted, 1);
        assert_eq!(report.skipped_missing_catalog, 1);
        assert!(db::catalog_contains(&conn, 10).unwrap());
        assert_eq!(db::playtime_record_count(&conn, 99).unwrap(), 0);
    }

    #[test]
    fn stored_playtime_matches_payload() {
        let mut conn = memory_conn();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store_owned_games(&mut conn, &[game(10, Some("Counter-Strike"), 120)], now).unwrap();

        let entry = db::library_entries(&conn).unwrap().remove(0);
        assert_eq!(
            entry.playtime,
            Playtime {
                playtime_forever: 120,
                playtime_windows: 120,
                last_played: 1_700_000_000,
                ..Default::default()
            }
        );
        assert_eq!(entry.timestamp, now);
        assert!(!entry.favourite);
        assert!(!entry.now_playing);
    }

    /// Answers 503 a fixed number of times before returning the owned games
    struct FlakySteam {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SteamApi for FlakySteam {
        async fn owned_games(&self) -> Result<OwnedGames, SteamApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(SteamApiError::Status {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                });
            }
            Ok(OwnedGames {
                game_count: 1,
                games: vec![game(10, Some("Counter-Strike"), 30)],
            })
        }

        async fn app_list(&self) -> Result<Vec<CatalogEntry>, SteamApiError> {
            Err(SteamApiError::MissingField("applist"))
        }

        async fn player_summary(&self) -> Result<Value, SteamApiError> {
            Err(SteamApiError::MissingField("players"))
        }

        async fn recently_played(&self) -> Result<Value, SteamApiError> {
            Err(SteamApiError::MissingField("response"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn owned_sync_blocks_until_steam_answers() {
        let steam = FlakySteam { failures: 3, calls: AtomicU32::new(0) };
        let db = Database::open_in_memory().unwrap();

        let report = sync_owned_apps(&steam, &db, &RetryPolicy::forever(Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(steam.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.owned_inserted, 1);
    }

    #[tokio::test]
    async fn boot_survives_catalog_failure() {
        let steam = FlakySteam { failures: 0, calls: AtomicU32::new(0) };
        let db = Database::open_in_memory().unwrap();

        let report = boot_sync(&steam, &db, &RetryPolicy::default()).await.unwrap();

        assert_eq!(report.owned_inserted, 1);
        let conn = db.lock().await;
        assert!(db::catalog_contains(&conn, 10).unwrap());
        assert_eq!(db::latest_catalog_metadata(&conn).unwrap(), None);
    }

    #[tokio::test]
    async fn catalog_sync_propagates_fetch_errors() {
        let steam = FlakySteam { failures: 0, calls: AtomicU32::new(0) };
        let db = Database::open_in_memory().unwrap();

        let err = sync_catalog(&steam, &db).await.unwrap_err();
        assert!(matches!(err, SyncError::Steam(SteamApiError::MissingField(_))));
        assert!(db::catalog_is_empty(&*db.lock().await).unwrap());
    }
}
