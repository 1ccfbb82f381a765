pub mod connection;
pub mod manager;
pub mod models;
pub mod query;
pub mod registry;
pub mod scanner;

pub use connection::Database;
pub use manager::{DbManager, DbStatus};
pub use models::{BeatmapId, BeatmapInfo, BeatmapOnlineStatus, BeatmapSetId, BeatmapSetInfo};
pub use registry::{BeatmapDatabase, BeatmapRegistry, RegistryError};
