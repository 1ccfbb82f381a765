//! Application entry point.
//!
//! Runs the song select headless: the database thread fills the registry,
//! the screen follows it at a fixed frame rate and finally starts the
//! selected beatmap.

mod config;
mod database;
mod models;
mod screens;
mod settings;
mod system;
mod ui;

use crate::config::{CONFIG_PATH, GameConfig};
use crate::database::{BeatmapDatabase, BeatmapRegistry, DbManager, DbStatus};
use crate::models::Bindable;
use crate::screens::PlaySongSelect;
use crate::settings::{GraphicsBindables, HostInfo, Platform, RendererSettings, RendererType};
use crate::ui::NotificationQueue;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long the headless loop keeps the screen alive.
const RUN_DURATION: Duration = Duration::from_secs(2);
const DB_TIMEOUT: Duration = Duration::from_secs(60);

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    log::info!("MAIN: Booting song select...");

    let config = GameConfig::load_or_default(Path::new(CONFIG_PATH));
    let rescan = std::env::args().any(|arg| arg == "--rescan");

    let registry = BeatmapDatabase::new();
    let db_manager = DbManager::new(
        config.database_path.clone(),
        config.songs_path.clone(),
        registry.clone(),
    );
    db_manager.init();
    db_manager.load();
    if !db_manager.wait_idle(DB_TIMEOUT) {
        log::warn!("MAIN: Database still busy after {:?}", DB_TIMEOUT);
    }

    let play_mode = Bindable::new(config.play_mode);
    let mut screen = PlaySongSelect::new(
        Arc::new(registry.clone()) as Arc<dyn BeatmapRegistry>,
        config.toolbar_height,
    );
    screen.load(Some(&play_mode));
    log::info!("MAIN: {} beatmap sets listed", screen.groups().len());

    // Sets imported by a rescan reach the screen through the registry.
    if rescan {
        db_manager.rescan();
    }

    let notifications = NotificationQueue::new();
    let host = HostInfo {
        platform: Platform::current(),
        resolved_renderer: resolve_renderer(config.graphics.renderer, Platform::current()),
    };
    let graphics = GraphicsBindables::from_settings(&config.graphics);
    let renderer_settings = RendererSettings::new(graphics.clone(), host, notifications.clone());
    log::debug!("MAIN: Settings layout {:?}", renderer_settings.build());

    run_frames(&mut screen, &config);

    if rescan && !db_manager.wait_idle(DB_TIMEOUT) {
        log::warn!("MAIN: Rescan still running after {:?}", DB_TIMEOUT);
    }
    screen.update();

    if let DbStatus::Error(e) = db_manager.status() {
        log::error!("MAIN: Database error: {}", e);
    }

    for group in screen.groups() {
        log::info!(
            "MAIN: {} {} ({} difficulties){}",
            group.id(),
            group.set().display_title(),
            group.set().beatmaps.len(),
            if group.collapsed() { "" } else { " [expanded]" }
        );
    }

    if let Some(warning) = screen.pending_warning() {
        for line in screens::warning::plain_text(&screens::QualifiedWarning::paragraphs()) {
            log::warn!("MAIN: {}", line);
        }
        log::info!("MAIN: Warning shown for {:?}", warning.display_duration());
    }

    match screen.play() {
        Some(beatmap) => log::info!(
            "MAIN: Starting {} [{}] in {}",
            beatmap.id,
            beatmap.version,
            screen.play_mode().display_name()
        ),
        None => log::info!("MAIN: Nothing to play"),
    }

    for notification in notifications.drain() {
        log::warn!("MAIN: {}", notification.text);
    }

    screen.dispose();
    drop(renderer_settings);

    let mut config = config;
    config.play_mode = play_mode.value();
    config.graphics = graphics.to_settings();
    if let Err(e) = config.save(Path::new(CONFIG_PATH)) {
        log::error!("MAIN: {}", e);
    }

    db_manager.shutdown();
    log::info!("MAIN: Bye");
}

/// Fixed-timestep frame loop driving the screen's scheduler.
fn run_frames(screen: &mut PlaySongSelect, config: &GameConfig) {
    let target_dt = config.frame_time();
    let start = Instant::now();
    let mut accumulator = Duration::ZERO;
    let mut last_time = start;
    let mut frames = 0u64;
    let mut tasks = 0usize;

    while start.elapsed() < RUN_DURATION {
        let current_time = Instant::now();
        accumulator += current_time - last_time;
        last_time = current_time;

        let mut loops = 0;
        while accumulator >= target_dt && loops < 10 {
            tasks += screen.update();
            accumulator -= target_dt;
            loops += 1;
            frames += 1;
        }

        if loops == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }

    log::info!("MAIN: {} frames, {} scheduled tasks run", frames, tasks);
}

/// Renderer the host starts with for a configured choice.
fn resolve_renderer(configured: RendererType, platform: Platform) -> RendererType {
    let available = platform.preferred_renderers();
    if configured != RendererType::Automatic && available.contains(&configured) {
        return configured;
    }
    available
        .into_iter()
        .find(|r| *r != RendererType::Automatic)
        .unwrap_or(RendererType::OpenGlLegacy)
}
