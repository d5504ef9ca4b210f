//! Playtime history operations

use chrono::{DateTime, Utc};
use playlist_core::Playtime;
use rusqlite::{params, Connection};

use super::{appid_to_sql, DbError};

/// Append one playtime snapshot. History is never updated in place.
pub fn append_playtime(
    conn: &Connection,
    appid: u64,
    playtime: &Playtime,
    timestamp: DateTime<Utc>,
) -> Result<(), DbError> {
    conn.execute(
        r#"
        INSERT INTO steam_user_apps_playtime (
            appid, playtime_forever, playtime_windows, playtime_mac, playtime_linux,
            playtime_deck, playtime_disconnected, last_played, timestamp
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            appid_to_sql(appid),
            playtime.playtime_forever,
            playtime.playtime_windows,
            playtime.playtime_mac,
            playtime.playtime_linux,
            playtime.playtime_deck,
            playtime.playtime_disconnected,
            playtime.last_played,
            timestamp,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
pub fn playtime_record_count(conn: &Connection, appid: u64) -> Result<i64, DbError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM steam_user_apps_playtime WHERE appid = ?1",
        [appid_to_sql(appid)],
        |row| row.get(0),
    )?;
    Ok(count)
}
