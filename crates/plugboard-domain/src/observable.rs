//! Synchronous publish-subscribe primitive
//!
//! A lightweight observable: register a listener, get an unsubscribe token,
//! notifications run synchronously on the notifying thread. Built-in services
//! use it for change notification (for example the settings store); it is not
//! part of the resolver contract.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type ObserverFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Token returned by [`Observable::add_observer`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverToken(u64);

/// Synchronous multi-listener notification channel.
///
/// Listeners are invoked in registration order. Notification snapshots the
/// listener list first, so a listener may add or remove observers (including
/// itself) without deadlocking; such changes take effect from the next
/// notification.
pub struct Observable<T> {
    observers: RwLock<BTreeMap<u64, ObserverFn<T>>>,
    next_id: AtomicU64,
}

impl<T> Observable<T> {
    /// Create an observable with no listeners
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a listener; the returned token removes it again
    pub fn add_observer<F>(&self, observer: F) -> ObserverToken
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.write_observers().insert(id, Arc::new(observer));
        ObserverToken(id)
    }

    /// Remove a listener; returns false when the token was already removed
    pub fn remove_observer(&self, token: ObserverToken) -> bool {
        self.write_observers().remove(&token.0).is_some()
    }

    /// Invoke every registered listener with `value`, in registration order
    pub fn notify_observers(&self, value: &T) {
        let snapshot: Vec<ObserverFn<T>> = self.read_observers().values().cloned().collect();
        for observer in snapshot {
            observer(value);
        }
    }

    /// Drop all listeners
    pub fn clear(&self) {
        self.write_observers().clear();
    }

    /// Number of registered listeners
    pub fn observer_count(&self) -> usize {
        self.read_observers().len()
    }
}

impl<T> Observable<T> {
    // Observers are plain callbacks; a panic inside one poisons the lock but
    // leaves the map itself intact, so poisoned guards are safe to reuse.
    fn read_observers(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<u64, ObserverFn<T>>> {
        self.observers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_observers(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<u64, ObserverFn<T>>> {
        self.observers.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observer_count())
            .finish()
    }
}
