//! Screens and overlays.

pub mod song_select;
pub mod warning;

pub use song_select::{BeatmapGroup, PlaySongSelect, SelectionError};
pub use warning::QualifiedWarning;
