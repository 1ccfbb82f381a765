//! Notifications posted by screens and settings panels.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// What happens when the user activates a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationActivation {
    /// Close the overlay, nothing else.
    Dismiss,
    /// Hide the overlay and ask the game to exit (so a restart applies).
    AttemptExit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub important: bool,
    pub activation: NotificationActivation,
}

/// Shared queue of posted notifications. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    inner: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, notification: Notification) {
        log::info!("UI: Notification posted: {}", notification.text);
        self.lock().push_back(notification);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
