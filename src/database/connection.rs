use crate::database::models::{BeatmapSetId, BeatmapSetInfo};
use crate::database::query;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens or creates the database file.
    pub async fn new(db_path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let absolute_path = if db_path.is_absolute() {
            db_path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(db_path)
        };

        let options = SqliteConnectOptions::new()
            .filename(&absolute_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;
        let db = Database { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same memory store.
    pub async fn open_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let db = Database { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS beatmapset (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL UNIQUE,
                artist TEXT,
                title TEXT,
                status INTEGER NOT NULL DEFAULT -3
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS beatmap (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                beatmapset_id INTEGER NOT NULL,
                hash TEXT NOT NULL UNIQUE,
                path TEXT NOT NULL,
                version TEXT,
                mode INTEGER NOT NULL DEFAULT 0,
                note_count INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (beatmapset_id) REFERENCES beatmapset(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get_all_beatmapsets(&self) -> Result<Vec<BeatmapSetInfo>, sqlx::Error> {
        query::get_all_beatmapsets(&self.pool).await
    }

    pub async fn get_beatmapset(
        &self,
        id: BeatmapSetId,
    ) -> Result<Option<BeatmapSetInfo>, sqlx::Error> {
        query::get_beatmapset(&self.pool, id).await
    }

    pub async fn count_beatmapsets(&self) -> Result<i64, sqlx::Error> {
        query::count_beatmapsets(&self.pool).await
    }
}
