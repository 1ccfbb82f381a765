//! Data structures mirroring the SQLite tables, and the in-memory beatmap
//! types handed out by the registry.

use crate::models::PlayMode;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Primary key of a beatmapset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BeatmapSetId(pub i64);

/// Primary key of a beatmap row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BeatmapId(pub i64);

impl fmt::Display for BeatmapSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set#{}", self.0)
    }
}

impl fmt::Display for BeatmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{}", self.0)
    }
}

/// Ranking state of a beatmapset on the online listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BeatmapOnlineStatus {
    #[default]
    None,
    Graveyard,
    Wip,
    Pending,
    Ranked,
    Approved,
    Qualified,
    Loved,
}

impl BeatmapOnlineStatus {
    pub fn from_i64(value: i64) -> Self {
        match value {
            -2 => Self::Graveyard,
            -1 => Self::Wip,
            0 => Self::Pending,
            1 => Self::Ranked,
            2 => Self::Approved,
            3 => Self::Qualified,
            4 => Self::Loved,
            _ => Self::None,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Self::None => -3,
            Self::Graveyard => -2,
            Self::Wip => -1,
            Self::Pending => 0,
            Self::Ranked => 1,
            Self::Approved => 2,
            Self::Qualified => 3,
            Self::Loved => 4,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BeatmapsetRow {
    pub id: i64,
    pub path: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub status: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct BeatmapRow {
    pub id: i64,
    pub beatmapset_id: i64,
    pub hash: String, // MD5 of the .osu file
    pub path: String,
    pub version: Option<String>,
    pub mode: i64,
    pub note_count: i64,
}

/// One difficulty inside a set.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapInfo {
    pub id: BeatmapId,
    pub set_id: BeatmapSetId,
    pub hash: String,
    pub path: String,
    pub version: String,
    pub mode: PlayMode,
    pub note_count: u32,
}

impl From<BeatmapRow> for BeatmapInfo {
    fn from(row: BeatmapRow) -> Self {
        Self {
            id: BeatmapId(row.id),
            set_id: BeatmapSetId(row.beatmapset_id),
            hash: row.hash,
            path: row.path,
            version: row.version.unwrap_or_default(),
            mode: PlayMode::from_osu_mode(row.mode),
            note_count: row.note_count.max(0) as u32,
        }
    }
}

/// A beatmapset and, when fetched with children, its difficulties.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapSetInfo {
    pub id: BeatmapSetId,
    pub path: String,
    pub artist: String,
    pub title: String,
    pub status: BeatmapOnlineStatus,
    pub beatmaps: Vec<BeatmapInfo>,
}

impl BeatmapSetInfo {
    /// Builds the set from its row with no children attached.
    pub fn from_row(row: BeatmapsetRow) -> Self {
        Self {
            id: BeatmapSetId(row.id),
            path: row.path,
            artist: row.artist.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            status: BeatmapOnlineStatus::from_i64(row.status),
            beatmaps: Vec::new(),
        }
    }

    pub fn with_beatmaps(mut self, beatmaps: Vec<BeatmapInfo>) -> Self {
        self.beatmaps = beatmaps;
        self
    }

    /// Copy of the set without its difficulties.
    pub fn shallow(&self) -> Self {
        Self {
            beatmaps: Vec::new(),
            ..self.clone()
        }
    }

    pub fn contains(&self, beatmap: BeatmapId) -> bool {
        self.beatmaps.iter().any(|b| b.id == beatmap)
    }

    pub fn beatmap(&self, beatmap: BeatmapId) -> Option<&BeatmapInfo> {
        self.beatmaps.iter().find(|b| b.id == beatmap)
    }

    pub fn display_title(&self) -> String {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} - {}", self.artist, self.title),
            (true, false) => self.title.clone(),
            _ => self.path.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Set `id` with `count` difficulties numbered `id * 100 + n`.
    pub fn set_with_maps(id: i64, count: i64) -> BeatmapSetInfo {
        let beatmaps = (1..=count)
            .map(|n| BeatmapInfo {
                id: BeatmapId(id * 100 + n),
                set_id: BeatmapSetId(id),
                hash: format!("{:032x}", id * 100 + n),
                path: format!("songs/{id}/{n}.osu"),
                version: format!("Diff {n}"),
                mode: PlayMode::Mania,
                note_count: 100 * n as u32,
            })
            .collect();

        BeatmapSetInfo {
            id: BeatmapSetId(id),
            path: format!("songs/{id}"),
            artist: format!("Artist {id}"),
            title: format!("Title {id}"),
            status: BeatmapOnlineStatus::Ranked,
            beatmaps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::set_with_maps;
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(BeatmapOnlineStatus::from_i64(3), BeatmapOnlineStatus::Qualified);
        assert_eq!(BeatmapOnlineStatus::from_i64(-3), BeatmapOnlineStatus::None);
        assert_eq!(BeatmapOnlineStatus::Loved.as_i64(), 4);
    }

    #[test]
    fn test_shallow_drops_children() {
        let set = set_with_maps(7, 3);
        assert!(set.contains(BeatmapId(702)));
        assert!(!set.contains(BeatmapId(802)));

        let shallow = set.shallow();
        assert!(shallow.beatmaps.is_empty());
        assert_eq!(shallow.id, set.id);
        assert_eq!(shallow.display_title(), "Artist 7 - Title 7");
    }
}
