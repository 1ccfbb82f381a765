//! Filesystem scanner that imports beatmapsets into the database.
//!
//! Every sub-folder of `songs/` holding at least one `.osu` file is one set.

use crate::database::connection::Database;
use crate::database::models::BeatmapSetId;
use crate::database::query::{NewBeatmap, insert_beatmap, insert_beatmapset};
use crate::models::PlayMode;
use md5::Context;
use rosu_map::section::general::GameMode;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Scans `songs_path` and upserts every set found.
///
/// Returns the IDs of the sets written, in folder-name order. A set that
/// fails to import is logged and skipped.
pub async fn scan_songs_directory(
    db: &Database,
    songs_path: &Path,
) -> Result<Vec<BeatmapSetId>, ScanError> {
    if !songs_path.exists() {
        log::warn!("DB: Songs directory {:?} does not exist", songs_path);
        return Ok(Vec::new());
    }

    let mut folders: Vec<PathBuf> = fs::read_dir(songs_path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    folders.sort();

    let mut imported = Vec::new();
    for folder in folders {
        let osu_files = collect_osu_files(&folder)?;
        if osu_files.is_empty() {
            continue;
        }

        match process_beatmapset(db, &folder, &osu_files).await {
            Ok(Some(id)) => imported.push(id),
            Ok(None) => {}
            Err(e) => log::error!("DB: Error processing beatmapset {:?}: {}", folder, e),
        }
    }

    log::info!("DB: Scan finished, {} set(s) imported", imported.len());
    Ok(imported)
}

fn collect_osu_files(path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("osu"))
        .collect();
    files.sort();
    Ok(files)
}

async fn process_beatmapset(
    db: &Database,
    folder: &Path,
    osu_files: &[PathBuf],
) -> Result<Option<BeatmapSetId>, ScanError> {
    let Some(first_osu) = osu_files.first() else {
        return Ok(None);
    };
    let Some(path_str) = folder.to_str() else {
        return Ok(None);
    };

    let map = parse_chart(first_osu)?;
    let set_id = insert_beatmapset(
        db.pool(),
        path_str,
        Some(map.artist.as_str()),
        Some(map.title.as_str()),
        None,
    )
    .await?;

    for osu_file in osu_files {
        if let Err(e) = process_osu_file(db, set_id, osu_file).await {
            log::error!("DB: Error processing {:?}: {}", osu_file, e);
        }
    }

    Ok(Some(set_id))
}

async fn process_osu_file(
    db: &Database,
    set_id: BeatmapSetId,
    osu_file: &Path,
) -> Result<(), ScanError> {
    let Some(osu_str) = osu_file.to_str() else {
        return Ok(());
    };

    let hash = calculate_file_hash(osu_file)?;
    let bm = parse_chart(osu_file)?;

    insert_beatmap(
        db.pool(),
        set_id,
        &NewBeatmap {
            hash: &hash,
            path: osu_str,
            version: Some(bm.version.as_str()),
            mode: play_mode_of(bm.mode),
            note_count: bm.hit_objects.len() as u32,
        },
    )
    .await?;

    Ok(())
}

fn parse_chart(path: &Path) -> Result<rosu_map::Beatmap, ScanError> {
    rosu_map::Beatmap::from_path(path).map_err(|e| ScanError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn play_mode_of(mode: GameMode) -> PlayMode {
    match mode {
        GameMode::Osu => PlayMode::Osu,
        GameMode::Taiko => PlayMode::Taiko,
        GameMode::Catch => PlayMode::Catch,
        GameMode::Mania => PlayMode::Mania,
    }
}

/// Computes the MD5 hash for an `.osu` chart file.
fn calculate_file_hash(file_path: &Path) -> Result<String, std::io::Error> {
    let bytes = fs::read(file_path)?;

    let mut context = Context::new();
    context.consume(&bytes);
    Ok(format!("{:x}", context.finalize()))
}
