//! Raw sqlx query helpers for the persistent database layer.

use crate::database::models::{
    BeatmapInfo, BeatmapOnlineStatus, BeatmapRow, BeatmapSetId, BeatmapSetInfo, BeatmapsetRow,
};
use crate::models::PlayMode;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Columns written for a new or updated beatmap.
#[derive(Debug, Clone)]
pub struct NewBeatmap<'a> {
    pub hash: &'a str,
    pub path: &'a str,
    pub version: Option<&'a str>,
    pub mode: PlayMode,
    pub note_count: u32,
}

/// Inserts or updates a beatmapset keyed by its folder path.
///
/// A `None` status keeps the stored one (or the default for a new set).
pub async fn insert_beatmapset(
    pool: &SqlitePool,
    path: &str,
    artist: Option<&str>,
    title: Option<&str>,
    status: Option<BeatmapOnlineStatus>,
) -> Result<BeatmapSetId, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM beatmapset WHERE path = ?1")
        .bind(path)
        .fetch_optional(pool)
        .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE beatmapset SET artist = ?1, title = ?2, status = COALESCE(?3, status) WHERE id = ?4",
            )
            .bind(artist)
            .bind(title)
            .bind(status.map(|s| s.as_i64()))
            .bind(id)
            .execute(pool)
            .await?;
            Ok(BeatmapSetId(id))
        }
        None => {
            let result = sqlx::query(
                "INSERT INTO beatmapset (path, artist, title, status) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(path)
            .bind(artist)
            .bind(title)
            .bind(status.unwrap_or_default().as_i64())
            .execute(pool)
            .await?;
            Ok(BeatmapSetId(result.last_insert_rowid()))
        }
    }
}

/// Inserts or updates a beatmap keyed by its chart hash.
pub async fn insert_beatmap(
    pool: &SqlitePool,
    set_id: BeatmapSetId,
    beatmap: &NewBeatmap<'_>,
) -> Result<i64, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM beatmap WHERE hash = ?1")
        .bind(beatmap.hash)
        .fetch_optional(pool)
        .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE beatmap SET beatmapset_id = ?1, path = ?2, version = ?3, mode = ?4, note_count = ?5 WHERE id = ?6",
            )
            .bind(set_id.0)
            .bind(beatmap.path)
            .bind(beatmap.version)
            .bind(beatmap.mode.as_i64())
            .bind(i64::from(beatmap.note_count))
            .bind(id)
            .execute(pool)
            .await?;
            Ok(id)
        }
        None => {
            let result = sqlx::query(
                "INSERT INTO beatmap (beatmapset_id, hash, path, version, mode, note_count) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(set_id.0)
            .bind(beatmap.hash)
            .bind(beatmap.path)
            .bind(beatmap.version)
            .bind(beatmap.mode.as_i64())
            .bind(i64::from(beatmap.note_count))
            .execute(pool)
            .await?;
            Ok(result.last_insert_rowid())
        }
    }
}

/// Retrieves every beatmapset with its beatmaps, ordered by set ID.
pub async fn get_all_beatmapsets(pool: &SqlitePool) -> Result<Vec<BeatmapSetInfo>, sqlx::Error> {
    let sets: Vec<BeatmapsetRow> =
        sqlx::query_as("SELECT id, path, artist, title, status FROM beatmapset ORDER BY id")
            .fetch_all(pool)
            .await?;

    let beatmaps: Vec<BeatmapRow> = sqlx::query_as(
        "SELECT id, beatmapset_id, hash, path, version, mode, note_count FROM beatmap ORDER BY beatmapset_id, id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_set: HashMap<i64, Vec<BeatmapInfo>> = HashMap::new();
    for row in beatmaps {
        by_set
            .entry(row.beatmapset_id)
            .or_default()
            .push(BeatmapInfo::from(row));
    }

    Ok(sets
        .into_iter()
        .map(|row| {
            let children = by_set.remove(&row.id).unwrap_or_default();
            BeatmapSetInfo::from_row(row).with_beatmaps(children)
        })
        .collect())
}

/// Retrieves one beatmapset with its beatmaps.
pub async fn get_beatmapset(
    pool: &SqlitePool,
    id: BeatmapSetId,
) -> Result<Option<BeatmapSetInfo>, sqlx::Error> {
    let row: Option<BeatmapsetRow> =
        sqlx::query_as("SELECT id, path, artist, title, status FROM beatmapset WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(pool)
            .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let beatmaps: Vec<BeatmapRow> = sqlx::query_as(
        "SELECT id, beatmapset_id, hash, path, version, mode, note_count FROM beatmap WHERE beatmapset_id = ?1 ORDER BY id",
    )
    .bind(id.0)
    .fetch_all(pool)
    .await?;

    Ok(Some(
        BeatmapSetInfo::from_row(row)
            .with_beatmaps(beatmaps.into_iter().map(BeatmapInfo::from).collect()),
    ))
}

pub async fn count_beatmapsets(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM beatmapset")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn chart<'a>(hash: &'a str, path: &'a str, version: &'a str) -> NewBeatmap<'a> {
        NewBeatmap {
            hash,
            path,
            version: Some(version),
            mode: PlayMode::Mania,
            note_count: 321,
        }
    }

    #[tokio::test]
    async fn test_sets_come_back_with_children_in_id_order() {
        let db = Database::open_in_memory().await.unwrap();
        let pool = db.pool();

        let first = insert_beatmapset(pool, "songs/a", Some("A"), Some("Alpha"), Some(BeatmapOnlineStatus::Ranked))
            .await
            .unwrap();
        let second = insert_beatmapset(pool, "songs/b", Some("B"), Some("Beta"), Some(BeatmapOnlineStatus::Qualified))
            .await
            .unwrap();
        insert_beatmap(pool, second, &chart("h3", "songs/b/1.osu", "Hard")).await.unwrap();
        insert_beatmap(pool, first, &chart("h1", "songs/a/1.osu", "Easy")).await.unwrap();
        insert_beatmap(pool, first, &chart("h2", "songs/a/2.osu", "Normal")).await.unwrap();

        let sets = db.get_all_beatmapsets().await.unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].id, first);
        assert_eq!(sets[0].beatmaps.len(), 2);
        assert_eq!(sets[0].beatmaps[0].version, "Easy");
        assert_eq!(sets[1].status, BeatmapOnlineStatus::Qualified);
        assert_eq!(sets[1].beatmaps[0].note_count, 321);
        assert_eq!(db.count_beatmapsets().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upserts_keep_identity() {
        let db = Database::open_in_memory().await.unwrap();
        let pool = db.pool();

        let id = insert_beatmapset(pool, "songs/a", None, Some("Old"), None)
            .await
            .unwrap();
        let again = insert_beatmapset(pool, "songs/a", None, Some("New"), None)
            .await
            .unwrap();
        assert_eq!(id, again);

        let map = insert_beatmap(pool, id, &chart("h1", "songs/a/1.osu", "Easy")).await.unwrap();
        let map_again = insert_beatmap(pool, id, &chart("h1", "songs/a/1.osu", "Renamed")).await.unwrap();
        assert_eq!(map, map_again);

        let set = db.get_beatmapset(id).await.unwrap().unwrap();
        assert_eq!(set.title, "New");
        assert_eq!(set.beatmaps.len(), 1);
        assert_eq!(set.beatmaps[0].version, "Renamed");
    }

    #[tokio::test]
    async fn test_rescan_upsert_keeps_online_status() {
        let db = Database::open_in_memory().await.unwrap();
        let pool = db.pool();

        let id = insert_beatmapset(pool, "songs/q", None, Some("Q"), Some(BeatmapOnlineStatus::Qualified))
            .await
            .unwrap();
        insert_beatmapset(pool, "songs/q", None, Some("Q2"), None).await.unwrap();

        let set = db.get_beatmapset(id).await.unwrap().unwrap();
        assert_eq!(set.status, BeatmapOnlineStatus::Qualified);
        assert_eq!(set.title, "Q2");

        insert_beatmapset(pool, "songs/q", None, Some("Q2"), Some(BeatmapOnlineStatus::Ranked))
            .await
            .unwrap();
        let set = db.get_beatmapset(id).await.unwrap().unwrap();
        assert_eq!(set.status, BeatmapOnlineStatus::Ranked);

        let fresh = insert_beatmapset(pool, "songs/n", None, None, None).await.unwrap();
        let set = db.get_beatmapset(fresh).await.unwrap().unwrap();
        assert_eq!(set.status, BeatmapOnlineStatus::None);
    }

    #[tokio::test]
    async fn test_missing_set() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(db.get_beatmapset(BeatmapSetId(99)).await.unwrap().is_none());
        assert_eq!(db.count_beatmapsets().await.unwrap(), 0);
    }
}
