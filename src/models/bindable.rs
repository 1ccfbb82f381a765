//! Observable configuration values.
//!
//! A [`Bindable`] is a shared cell: clones point at the same value, and
//! every clone sees the same subscribers. Handlers are invoked outside the
//! internal lock, so a handler may read the bindable it listens to.

use crate::system::Subscription;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    handlers: Vec<(u64, Handler<T>)>,
    next_id: u64,
}

/// Shared value with change notifications.
pub struct Bindable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: Clone + PartialEq + Send + 'static> Bindable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                handlers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    pub fn value(&self) -> T {
        self.lock().value.clone()
    }

    /// Stores `value` and notifies subscribers if it differs from the
    /// current one. Returns whether a change happened.
    pub fn set(&self, value: T) -> bool {
        let handlers: Vec<Handler<T>> = {
            let mut inner = self.lock();
            if inner.value == value {
                return false;
            }
            inner.value = value.clone();
            inner.handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
        };

        for handler in handlers {
            handler(&value);
        }
        true
    }

    /// Registers `handler` for value changes until the returned handle drops.
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.handlers.push((id, Arc::new(handler)));
            id
        };

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
                inner.handlers.retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().handlers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A panicking handler never runs under the lock, so the data is intact.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Clone for Bindable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + Send + Default + 'static> Default for Bindable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + Send + std::fmt::Debug + 'static> std::fmt::Debug for Bindable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindable")
            .field("value", &self.value())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayMode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_set_notifies_only_on_change() {
        let mode = Bindable::new(PlayMode::Osu);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = mode.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!mode.set(PlayMode::Osu));
        assert!(mode.set(PlayMode::Mania));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mode.value(), PlayMode::Mania);
    }

    #[test]
    fn test_dropping_subscription_detaches_handler() {
        let mode = Bindable::new(PlayMode::Osu);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = mode.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(mode.subscriber_count(), 1);

        drop(sub);
        assert_eq!(mode.subscriber_count(), 0);
        mode.set(PlayMode::Taiko);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clones_share_value_and_handlers() {
        let mode = Bindable::new(PlayMode::Osu);
        let shared = mode.clone();
        let reader = mode.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = mode.subscribe(move |new| {
            // Reading back inside the handler must not deadlock.
            assert_eq!(reader.value(), *new);
            sink.lock().unwrap().push(*new);
        });

        shared.set(PlayMode::Catch);
        assert_eq!(mode.value(), PlayMode::Catch);
        assert_eq!(*seen.lock().unwrap(), vec![PlayMode::Catch]);
    }
}
