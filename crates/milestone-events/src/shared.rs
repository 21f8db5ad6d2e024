//! Thread-safe handle around an [`EventRegistry`].
//!
//! A single [`Mutex`] guards both the store and the subscriber list, and is
//! held for the whole of each operation including notification. Other
//! threads therefore never observe a half-applied clear or import, and
//! records from concurrent mutations are never interleaved.
//!
//! Subscribers run while the lock is held. A slow subscriber stalls every
//! thread using the registry, and a subscriber that calls back into the same
//! [`SharedEventRegistry`] deadlocks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use milestone_types::Snapshot;

use crate::mutation::Mutation;
use crate::registry::EventRegistry;
use crate::subscriber::{EventSubscriber, SubscriptionId};

/// Cloneable, lock-guarded registry handle.
///
/// Clones share the same underlying registry.
#[derive(Debug, Clone, Default)]
pub struct SharedEventRegistry {
    inner: Arc<Mutex<EventRegistry>>,
}

impl SharedEventRegistry {
    /// Create a handle around an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing registry.
    pub fn from_registry(registry: EventRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Run `f` with exclusive access to the registry.
    ///
    /// Use this to perform several operations atomically.
    pub fn with<R>(&self, f: impl FnOnce(&mut EventRegistry) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, EventRegistry> {
        // A subscriber panic leaves the store consistent: the mutation is
        // applied before any subscriber runs.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`EventRegistry::subscribe`].
    pub fn subscribe(&self, subscriber: impl EventSubscriber + 'static) -> SubscriptionId {
        self.lock().subscribe(subscriber)
    }

    /// See [`EventRegistry::unsubscribe`].
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    /// See [`EventRegistry::apply`].
    pub fn apply(&self, key: &str, namespace: &str, mutation: Mutation) -> i64 {
        self.lock().apply(key, namespace, mutation)
    }

    /// See [`EventRegistry::save`].
    pub fn save(&self, key: &str, namespace: &str) -> i64 {
        self.lock().save(key, namespace)
    }

    /// See [`EventRegistry::add_to`].
    pub fn add_to(&self, key: &str, amount: i64, namespace: &str) -> i64 {
        self.lock().add_to(key, amount, namespace)
    }

    /// See [`EventRegistry::remove_from`].
    pub fn remove_from(&self, key: &str, amount: i64, namespace: &str) -> i64 {
        self.lock().remove_from(key, amount, namespace)
    }

    /// See [`EventRegistry::set_value`].
    pub fn set_value(&self, key: &str, amount: i64, namespace: &str) -> i64 {
        self.lock().set_value(key, amount, namespace)
    }

    /// See [`EventRegistry::get`].
    pub fn get(&self, key: &str, namespace: &str) -> i64 {
        self.lock().get(key, namespace)
    }

    /// See [`EventRegistry::has_value`].
    pub fn has_value(&self, key: &str, namespace: &str) -> bool {
        self.lock().has_value(key, namespace)
    }

    /// See [`EventRegistry::clear_namespace`].
    pub fn clear_namespace(&self, namespace: &str) -> bool {
        self.lock().clear_namespace(namespace)
    }

    /// See [`EventRegistry::clear_all`].
    pub fn clear_all(&self) {
        self.lock().clear_all();
    }

    /// See [`EventRegistry::export_snapshot`].
    pub fn export_snapshot(&self) -> Snapshot {
        self.lock().export_snapshot()
    }

    /// See [`EventRegistry::import_snapshot`].
    pub fn import_snapshot(&self, snapshot: Snapshot) {
        self.lock().import_snapshot(snapshot);
    }
}

impl From<EventRegistry> for SharedEventRegistry {
    fn from(registry: EventRegistry) -> Self {
        Self::from_registry(registry)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use milestone_types::{DEFAULT_NAMESPACE, EventRecord};

    use super::*;

    #[test]
    fn clones_share_state() {
        let registry = SharedEventRegistry::new();
        let other = registry.clone();

        registry.save("shared", DEFAULT_NAMESPACE);
        assert_eq!(other.get("shared", DEFAULT_NAMESPACE), 1);
    }

    #[test]
    fn concurrent_saves_are_all_counted() {
        let registry = SharedEventRegistry::new();
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        registry.subscribe(move |_: &EventRecord| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        registry.save("kills", "arena");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.get("kills", "arena"), 800);
        assert_eq!(notified.load(Ordering::SeqCst), 800);
    }

    #[test]
    fn clear_all_records_are_not_interleaved() {
        let registry = SharedEventRegistry::new();
        for index in 0..50 {
            registry.save(&format!("key{index:02}"), "bulk");
        }
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        registry.subscribe(move |record: &EventRecord| {
            sink.lock().unwrap().push(record.clone());
        });

        let writer = {
            let registry = registry.clone();
            thread::spawn(move || registry.save("late", "other"))
        };
        registry.clear_all();
        writer.join().unwrap();

        let records = records.lock().unwrap();
        let zeroed: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.namespace == "bulk")
            .map(|(index, _)| index)
            .collect();
        assert_eq!(zeroed.len(), 50);
        assert_eq!(zeroed[49] - zeroed[0], 49);
    }

    #[test]
    fn with_runs_operations_atomically() {
        let registry = SharedEventRegistry::from(EventRegistry::new());
        let total = registry.with(|inner| {
            inner.add_to("gold", 10, "bank");
            inner.remove_from("gold", 3, "bank");
            inner.get("gold", "bank")
        });
        assert_eq!(total, 7);
    }

    #[test]
    fn survives_a_panicking_subscriber() {
        let registry = SharedEventRegistry::new();
        let id = registry.subscribe(|record: &EventRecord| {
            assert!(record.value < 2, "subscriber rejects values above one");
        });

        let panicking = registry.clone();
        let result = thread::spawn(move || {
            panicking.save("flaky", DEFAULT_NAMESPACE);
            panicking.save("flaky", DEFAULT_NAMESPACE);
        })
        .join();
        assert!(result.is_err());

        assert!(registry.unsubscribe(id));
        assert_eq!(registry.get("flaky", DEFAULT_NAMESPACE), 2);
        assert_eq!(registry.save("flaky", DEFAULT_NAMESPACE), 3);
    }

    #[test]
    fn snapshot_round_trip_through_handle() {
        let registry = SharedEventRegistry::new();
        registry.set_value("level", 4, "player");
        let snapshot = registry.export_snapshot();

        let restored = SharedEventRegistry::new();
        restored.import_snapshot(snapshot);
        assert_eq!(restored.get("level", "player"), 4);
        assert!(restored.has_value("level", "player"));
        assert!(!restored.clear_namespace("missing"));
        assert!(restored.clear_namespace("player"));
        assert!(!restored.has_value("level", "player"));
    }
}
