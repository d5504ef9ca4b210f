//! SQLite persistence for the catalog, owned apps and playtime history

mod catalog;
mod error;
mod library;
mod owned;
mod playtime;

pub use catalog::*;
pub use error::*;
pub use library::*;
pub use owned::*;
pub use playtime::*;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

// rusqlite has no ToSql/FromSql for u64, appids go through i64
#[inline]
fn appid_to_sql(appid: u64) -> i64 {
    appid as i64
}

#[inline]
fn appid_from_sql(val: i64) -> u64 {
    val as u64
}

/// Shared handle to the single SQLite connection
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file, creating its directory and tables
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

pub fn init_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // Platform-wide app catalog
    conn.execute(
        "CREATE TABLE IF NOT EXISTS steam_apps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            appid INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // One row per catalog sync
    conn.execute(
        "CREATE TABLE IF NOT EXISTS steam_apps_metadata (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            size INTEGER NOT NULL,
            timestamp TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS steam_user_apps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            appid INTEGER NOT NULL UNIQUE REFERENCES steam_apps(appid),
            now_playing INTEGER NOT NULL DEFAULT 0,
            favourite INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // Append-only playtime history, one row per sync per owned app
    conn.execute(
        "CREATE TABLE IF NOT EXISTS steam_user_apps_playtime (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            appid INTEGER NOT NULL REFERENCES steam_apps(appid),
            playtime_forever INTEGER NOT NULL,
            playtime_windows INTEGER NOT NULL,
            playtime_mac INTEGER NOT NULL,
            playtime_linux INTEGER NOT NULL,
            playtime_deck INTEGER NOT NULL,
            playtime_disconnected INTEGER NOT NULL,
            last_played INTEGER NOT NULL,
            timestamp TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_playtime_appid_timestamp
            ON steam_user_apps_playtime (appid, timestamp)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    pub fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        super::init_tables(&conn).unwrap();
        conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        init_tables(&conn).unwrap();
        assert!(catalog_is_empty(&conn).unwrap());
    }

    #[test]
    fn open_creates_missing_data_directory() {
        let dir = std::env::temp_dir().join(format!("playlist-db-test-{}", std::process::id()));
        let path = dir.join("nested").join("database.db");
        let _ = std::fs::remove_dir_all(&dir);

        Database::open(&path).unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
