//! Catalog and catalog-metadata operations

use chrono::{DateTime, Utc};
use playlist_core::{CatalogApp, CatalogMetadata};
use rusqlite::{params, Connection, OptionalExtension};

use super::{appid_to_sql, is_constraint_violation, DbError};

/// Rows written and rows rejected by one bulk catalog insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogInsert {
    pub inserted: usize,
    pub duplicates: usize,
}

pub fn catalog_is_empty(conn: &Connection) -> Result<bool, DbError> {
    Ok(catalog_size(conn)? == 0)
}

pub fn catalog_size(conn: &Connection) -> Result<i64, DbError> {
    let size = conn.query_row("SELECT COUNT(*) FROM steam_apps", [], |row| row.get(0))?;
    Ok(size)
}

pub fn catalog_contains(conn: &Connection, appid: u64) -> Result<bool, DbError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM steam_apps WHERE appid = ?1",
            [appid_to_sql(appid)],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Insert catalog apps in one transaction.
///
/// A row that violates a constraint (already present appid) is logged and
/// counted, never fatal. Any other SQLite error aborts the whole batch.
pub fn insert_catalog_apps(conn: &mut Connection, apps: &[CatalogApp]) -> Result<CatalogInsert, DbError> {
    let tx = conn.transaction()?;
    let mut outcome = CatalogInsert::default();
    {
        let mut stmt = tx.prepare("INSERT INTO steam_apps (appid, name) VALUES (?1, ?2)")?;
        for app in apps {
            match stmt.execute(params![appid_to_sql(app.appid), app.name]) {
                Ok(_) => outcome.inserted += 1,
                Err(e) if is_constraint_violation(&e) => {
                    tracing::debug!(appid = app.appid, "Catalog app already stored: {}", e);
                    outcome.duplicates += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    tx.commit()?;
    Ok(outcome)
}

/// Insert a single catalog app unless its appid is already present
pub fn insert_catalog_app_if_absent(conn: &Connection, app: &CatalogApp) -> Result<bool, DbError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO steam_apps (appid, name) VALUES (?1, ?2)",
        params![appid_to_sql(app.appid), app.name],
    )?;
    Ok(changed > 0)
}

pub fn record_catalog_metadata(
    conn: &Connection,
    size: i64,
    timestamp: DateTime<Utc>,
) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO steam_apps_metadata (size, timestamp) VALUES (?1, ?2)",
        params![size, timestamp],
    )?;
    Ok(())
}

/// Most recent metadata snapshot, if the catalog was ever synced
pub fn latest_catalog_metadata(conn: &Connection) -> Result<Option<CatalogMetadata>, DbError> {
    let metadata = conn
        .query_row(
            "SELECT size, timestamp FROM steam_apps_metadata ORDER BY timestamp DESC, id DESC LIMIT 1",
            [],
            |row| {
                Ok(CatalogMetadata {
                    size: row.get(0)?,
                    timestamp: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(metadata)
}
