//! Scoped event subscriptions.
//!
//! Every `subscribe` call in the crate hands back a [`Subscription`]. The
//! handler stays registered for as long as the handle is alive; dropping the
//! handle (or calling [`Subscription::unsubscribe`]) detaches it.

use std::fmt;

/// RAII handle for a registered event handler.
#[must_use = "dropping a Subscription immediately detaches the handler"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Handle that owns nothing. Used when the source is already gone.
    pub fn detached() -> Self {
        Self { release: None }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Detaches the handler now instead of at drop time.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
