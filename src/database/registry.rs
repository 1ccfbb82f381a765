//! Beatmap registry consumed by the song select screen.
//!
//! The registry is the in-memory view of the beatmap database. The
//! [`DbManager`](crate::database::DbManager) fills it from its worker thread,
//! and screens read it from the UI thread. "Set added" handlers therefore
//! run on whichever thread performed the insert; handlers are expected to
//! forward the work to a scheduler instead of touching UI state.

use crate::database::models::{BeatmapSetId, BeatmapSetInfo};
use crate::system::Subscription;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("beatmap set {0} is not in the registry")]
    NotFound(BeatmapSetId),
}

/// Handler invoked with the (shallow) set that was just added.
pub type SetAddedHandler = Box<dyn Fn(&BeatmapSetInfo) + Send + Sync>;

/// Read side of the beatmap store.
pub trait BeatmapRegistry: Send + Sync {
    /// Every known set in ascending ID order. Children are not loaded.
    fn query_all(&self) -> Vec<BeatmapSetInfo>;

    /// The set with its full list of beatmaps.
    fn fetch_with_children(&self, id: BeatmapSetId) -> Result<BeatmapSetInfo, RegistryError>;

    /// Registers `handler` for newly added sets until the handle is dropped.
    fn subscribe_set_added(&self, handler: SetAddedHandler) -> Subscription;
}

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Arc<SetAddedHandler>)>>,
}

/// In-memory registry shared between the database thread and the UI.
#[derive(Clone, Default)]
pub struct BeatmapDatabase {
    sets: Arc<RwLock<BTreeMap<BeatmapSetId, BeatmapSetInfo>>>,
    listeners: Arc<Listeners>,
}

impl BeatmapDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `set` (replacing any previous copy) and notifies subscribers.
    ///
    /// Subscribers receive a copy without children, like an import event
    /// that fires before the difficulties are attached.
    pub fn insert(&self, set: BeatmapSetInfo) {
        let event = set.shallow();
        {
            let mut sets = self.sets.write().unwrap_or_else(|e| e.into_inner());
            sets.insert(set.id, set);
        }
        log::debug!("DB: Registry now holds {}", event.id);

        let handlers: Vec<Arc<SetAddedHandler>> = {
            let handlers = self
                .listeners
                .handlers
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.sets.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl BeatmapRegistry for BeatmapDatabase {
    fn query_all(&self) -> Vec<BeatmapSetInfo> {
        let sets = self.sets.read().unwrap_or_else(|e| e.into_inner());
        sets.values().map(BeatmapSetInfo::shallow).collect()
    }

    fn fetch_with_children(&self, id: BeatmapSetId) -> Result<BeatmapSetInfo, RegistryError> {
        let sets = self.sets.read().unwrap_or_else(|e| e.into_inner());
        sets.get(&id).cloned().ok_or(RegistryError::NotFound(id))
    }

    fn subscribe_set_added(&self, handler: SetAddedHandler) -> Subscription {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(handler)));

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .handlers
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }
}
