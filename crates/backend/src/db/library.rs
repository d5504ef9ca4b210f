//! Joined owned-app / catalog / playtime reads backing the library views

use playlist_core::{LibraryEntry, Playtime};
use rusqlite::{Connection, OptionalExtension, Row};

use super::{appid_from_sql, DbError};

const LIBRARY_SELECT: &str = r#"
    SELECT u.id, u.appid, a.name, u.now_playing, u.favourite,
           p.playtime_forever, p.playtime_windows, p.playtime_mac, p.playtime_linux,
           p.playtime_deck, p.playtime_disconnected, p.last_played, p.timestamp
    FROM steam_user_apps u
    JOIN steam_apps a ON a.appid = u.appid
    JOIN steam_user_apps_playtime p ON p.appid = u.appid
"#;

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<LibraryEntry> {
    Ok(LibraryEntry {
        id: row.get(0)?,
        appid: appid_from_sql(row.get(1)?),
        name: row.get(2)?,
        now_playing: row.get(3)?,
        favourite: row.get(4)?,
        playtime: Playtime {
            playtime_forever: row.get(5)?,
            playtime_windows: row.get(6)?,
            playtime_mac: row.get(7)?,
            playtime_linux: row.get(8)?,
            playtime_deck: row.get(9)?,
            playtime_disconnected: row.get(10)?,
            last_played: row.get(11)?,
        },
        timestamp: row.get(12)?,
    })
}

/// Every playtime record of every owned app, newest first.
///
/// Records with the same timestamp come back in reverse insertion order, so
/// the first row per appid is always its latest snapshot.
pub fn library_entries(conn: &Connection) -> Result<Vec<LibraryEntry>, DbError> {
    let sql = format!("{} ORDER BY p.timestamp DESC, p.id DESC", LIBRARY_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Latest record of one owned app by its local id
pub fn latest_library_entry(conn: &Connection, id: i64) -> Result<Option<LibraryEntry>, DbError> {
    let sql = format!(
        "{} WHERE u.id = ?1 ORDER BY p.timestamp DESC, p.id DESC LIMIT 1",
        LIBRARY_SELECT
    );
    let entry = conn.query_row(&sql, [id], entry_from_row).optional()?;
    Ok(entry)
}
