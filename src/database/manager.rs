//! Background database thread.
//!
//! SQLite access is async (sqlx) while screens are not, so the manager owns a
//! dedicated thread with its own tokio runtime. Commands go in over a
//! channel; results come out through the shared [`DbState`] and by inserting
//! sets into the [`BeatmapDatabase`] registry, which fires its "set added"
//! handlers from this thread.

use crate::database::connection::Database;
use crate::database::registry::BeatmapDatabase;
use crate::database::scanner::scan_songs_directory;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum DbStatus {
    Idle,
    Initializing,
    Loading,
    Scanning,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct DbState {
    pub status: DbStatus,
    /// Sets pushed into the registry since startup.
    pub published_sets: usize,
    /// Commands sent but not finished yet.
    pub pending_commands: usize,
}

impl DbState {
    pub fn new() -> Self {
        Self {
            status: DbStatus::Idle,
            published_sets: 0,
            pending_commands: 0,
        }
    }
}

impl Default for DbState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum DbCommand {
    Init,
    Load,
    Rescan,
    Shutdown,
}

pub struct DbManager {
    state: Arc<Mutex<DbState>>,
    command_sender: Sender<DbCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DbManager {
    pub fn new(db_path: PathBuf, songs_path: PathBuf, registry: BeatmapDatabase) -> Self {
        let state = Arc::new(Mutex::new(DbState::new()));
        let (tx, rx) = unbounded();

        let state_clone = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("Database Thread".to_string())
            .spawn(move || Self::db_thread(state_clone, rx, db_path, songs_path, registry));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("DB: Failed to spawn database thread: {}", e);
                lock(&state).status = DbStatus::Error(format!("Thread spawn error: {}", e));
                None
            }
        };

        Self {
            state,
            command_sender: tx,
            handle,
        }
    }

    fn db_thread(
        state: Arc<Mutex<DbState>>,
        rx: Receiver<DbCommand>,
        db_path: PathBuf,
        songs_path: PathBuf,
        registry: BeatmapDatabase,
    ) {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("DB: Failed to build runtime: {}", e);
                lock(&state).status = DbStatus::Error(format!("Runtime error: {}", e));
                return;
            }
        };
        log::info!("DB: Thread started");

        let mut db: Option<Database> = None;

        while let Ok(command) = rx.recv() {
            log::debug!("DB: Command {:?}", command);
            match command {
                DbCommand::Init => {
                    db = rt.block_on(Self::open(&state, &db_path));
                }
                DbCommand::Load => match db {
                    Some(ref d) => rt.block_on(Self::load_maps(&state, d, &registry)),
                    None => log::warn!("DB: Load requested before Init"),
                },
                DbCommand::Rescan => match db {
                    Some(ref d) => rt.block_on(Self::rescan_maps(&state, d, &songs_path, &registry)),
                    None => log::warn!("DB: Rescan requested before Init"),
                },
                DbCommand::Shutdown => {
                    finish_command(&state);
                    break;
                }
            }
            finish_command(&state);
        }

        log::info!("DB: Thread stopped");
    }

    async fn open(state: &Arc<Mutex<DbState>>, db_path: &Path) -> Option<Database> {
        lock(state).status = DbStatus::Initializing;

        match Database::new(db_path).await {
            Ok(d) => {
                lock(state).status = DbStatus::Idle;
                log::info!("DB: Opened {:?}", db_path);
                Some(d)
            }
            Err(e) => {
                log::error!("DB: Initialization error: {}", e);
                lock(state).status = DbStatus::Error(format!("Initialization error: {}", e));
                None
            }
        }
    }

    async fn load_maps(state: &Arc<Mutex<DbState>>, db: &Database, registry: &BeatmapDatabase) {
        lock(state).status = DbStatus::Loading;

        match db.get_all_beatmapsets().await {
            Ok(sets) => {
                let count = sets.len();
                for set in sets {
                    registry.insert(set);
                }
                let mut s = lock(state);
                s.published_sets += count;
                s.status = DbStatus::Idle;
                log::info!("DB: Loaded {} beatmap set(s)", count);
            }
            Err(e) => {
                log::error!("DB: Loading error: {}", e);
                lock(state).status = DbStatus::Error(format!("Loading error: {}", e));
            }
        }
    }

    async fn rescan_maps(
        state: &Arc<Mutex<DbState>>,
        db: &Database,
        songs_path: &Path,
        registry: &BeatmapDatabase,
    ) {
        lock(state).status = DbStatus::Scanning;

        let imported = match scan_songs_directory(db, songs_path).await {
            Ok(ids) => ids,
            Err(e) => {
                log::error!("DB: Scan error: {}", e);
                lock(state).status = DbStatus::Error(format!("Scan error: {}", e));
                return;
            }
        };

        let mut published = 0;
        for id in imported {
            match db.get_beatmapset(id).await {
                Ok(Some(set)) => {
                    registry.insert(set);
                    published += 1;
                }
                Ok(None) => log::warn!("DB: Imported {} vanished before publishing", id),
                Err(e) => log::error!("DB: Failed to read back {}: {}", id, e),
            }
        }

        let mut s = lock(state);
        s.published_sets += published;
        s.status = DbStatus::Idle;
    }

    pub fn get_state(&self) -> Arc<Mutex<DbState>> {
        Arc::clone(&self.state)
    }

    pub fn status(&self) -> DbStatus {
        lock(&self.state).status.clone()
    }

    pub fn send_command(&self, cmd: DbCommand) -> Result<(), crossbeam_channel::SendError<DbCommand>> {
        lock(&self.state).pending_commands += 1;
        self.command_sender.send(cmd).inspect_err(|_| {
            finish_command(&self.state);
        })
    }

    pub fn init(&self) {
        let _ = self.send_command(DbCommand::Init);
    }

    pub fn load(&self) {
        let _ = self.send_command(DbCommand::Load);
    }

    pub fn rescan(&self) {
        let _ = self.send_command(DbCommand::Rescan);
    }

    /// Blocks until every command sent so far has finished, or `timeout`
    /// elapses. Returns whether the queue drained.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if lock(&self.state).pending_commands == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Stops the thread after the commands already queued.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.send_command(DbCommand::Shutdown);
            if handle.join().is_err() {
                log::error!("DB: Database thread panicked");
            }
        }
    }
}

impl Drop for DbManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &Mutex<DbState>) -> MutexGuard<'_, DbState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn finish_command(state: &Mutex<DbState>) {
    let mut s = lock(state);
    s.pending_commands = s.pending_commands.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::registry::BeatmapRegistry;

    #[test]
    fn test_init_and_load_empty_database() {
        let dir = std::env::temp_dir().join("rvsrg_select_manager_test");
        let _ = std::fs::remove_dir_all(&dir);

        let registry = BeatmapDatabase::new();
        let manager = DbManager::new(dir.join("main.db"), dir.join("songs"), registry.clone());
        manager.init();
        manager.load();
        manager.rescan();

        assert!(manager.wait_idle(Duration::from_secs(10)));
        assert_eq!(manager.status(), DbStatus::Idle);
        assert!(registry.query_all().is_empty());
        assert!(dir.join("main.db").exists());

        manager.shutdown();
        let _ = std::fs::remove_dir_all(&dir);
    }
}
