use serde::{Deserialize, Serialize};

/// Ruleset a beatmap is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    #[default]
    Osu,
    Taiko,
    Catch,
    Mania,
}

impl PlayMode {
    /// Maps the `Mode:` value of an `.osu` file.
    pub fn from_osu_mode(mode: i64) -> Self {
        match mode {
            1 => PlayMode::Taiko,
            2 => PlayMode::Catch,
            3 => PlayMode::Mania,
            _ => PlayMode::Osu,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            PlayMode::Osu => 0,
            PlayMode::Taiko => 1,
            PlayMode::Catch => 2,
            PlayMode::Mania => 3,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlayMode::Osu => "osu!",
            PlayMode::Taiko => "osu!taiko",
            PlayMode::Catch => "osu!catch",
            PlayMode::Mania => "osu!mania",
        }
    }
}
