//! Owned-app operations

use playlist_core::{OwnedApp, OwnedAppSummary};
use rusqlite::{Connection, OptionalExtension};

use super::{appid_from_sql, appid_to_sql, is_unique_violation, DbError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedInsert {
    Inserted,
    /// Row for this appid already existed
    Existing,
}

/// Insert an owned app with both flags cleared.
///
/// Re-inserting an existing appid is expected on every sync and reported as
/// `Existing`. A missing catalog row (foreign key) is still an error.
pub fn insert_owned_app(conn: &Connection, appid: u64) -> Result<OwnedInsert, DbError> {
    match conn.execute(
        "INSERT INTO steam_user_apps (appid, now_playing, favourite) VALUES (?1, 0, 0)",
        [appid_to_sql(appid)],
    ) {
        Ok(_) => Ok(OwnedInsert::Inserted),
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!(appid, "Owned app already stored");
            Ok(OwnedInsert::Existing)
        }
        Err(e) => Err(e.into()),
    }
}

/// Flip the favourite flag and return the updated row (`None` if the id is unknown)
pub fn toggle_favourite(conn: &Connection, id: i64) -> Result<Option<OwnedApp>, DbError> {
    let app = conn
        .query_row(
            r#"
            UPDATE steam_user_apps SET favourite = 1 - favourite
            WHERE id = ?1
            RETURNING id, appid, now_playing, favourite
            "#,
            [id],
            |row| {
                Ok(OwnedApp {
                    id: row.get(0)?,
                    appid: appid_from_sql(row.get(1)?),
                    now_playing: row.get(2)?,
                    favourite: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(app)
}

/// Every owned app with its name and highest recorded playtime
pub fn list_owned_apps(conn: &Connection) -> Result<Vec<OwnedAppSummary>, DbError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT u.id, u.appid, a.name, u.now_playing, u.favourite,
               MAX(p.playtime_forever) AS playtime_forever
        FROM steam_user_apps u
        JOIN steam_apps a ON a.appid = u.appid
        LEFT JOIN steam_user_apps_playtime p ON p.appid = u.appid
        GROUP BY u.id
        ORDER BY u.id
        "#,
    )?;

    let apps = stmt
        .query_map([], |row| {
            Ok(OwnedAppSummary {
                id: row.get(0)?,
                appid: appid_from_sql(row.get(1)?),
                name: row.get(2)?,
                now_playing: row.get(3)?,
                favourite: row.get(4)?,
                playtime_forever: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(apps)
}
