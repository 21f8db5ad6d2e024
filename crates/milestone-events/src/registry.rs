//! The event registry: a namespace -> key -> value store with change
//! notification.
//!
//! [`EventRegistry`] is the single owner of event state. Entries are created
//! lazily on first mutation and destroyed only by [`clear_namespace`],
//! [`clear_all`], or a snapshot [`import_snapshot`]. Reads never create
//! entries; absent namespaces and keys read as `0`.
//!
//! Namespaces and keys keep the order they were first written in, so bulk
//! operations notify namespaces in creation order, then keys in creation
//! order within each namespace. An imported snapshot keeps its own order.
//!
//! [`clear_namespace`]: EventRegistry::clear_namespace
//! [`clear_all`]: EventRegistry::clear_all
//! [`import_snapshot`]: EventRegistry::import_snapshot

use indexmap::IndexMap;
use milestone_types::{EventRecord, NamespaceEvents, Snapshot};
use tracing::debug;

use crate::mutation::Mutation;
use crate::subscriber::{EventSubscriber, SubscriberList, SubscriptionId};

/// In-memory store of integer events with synchronous change notification.
///
/// Every mutating method notifies all subscribers before returning, once
/// per key-level change, in registration order. Mutations take `&mut self`;
/// see [`SharedEventRegistry`](crate::SharedEventRegistry) for a handle that
/// can be shared across threads.
#[derive(Debug, Default)]
pub struct EventRegistry {
    /// namespace -> key -> value.
    events: IndexMap<String, NamespaceEvents>,
    subscribers: SubscriberList,
}

impl EventRegistry {
    /// Create an empty registry with no subscribers.
    pub fn new() -> Self {
        Self {
            events: IndexMap::new(),
            subscribers: SubscriberList::new(),
        }
    }

    /// Create a registry hydrated from a previously exported snapshot.
    ///
    /// No notifications are emitted since nothing can have subscribed yet.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            events: snapshot.into_inner(),
            subscribers: SubscriberList::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Subscribers
    // -----------------------------------------------------------------------

    /// Register a subscriber. It receives every change made after this call.
    pub fn subscribe(&mut self, subscriber: impl EventSubscriber + 'static) -> SubscriptionId {
        let id = self.subscribers.push(Box::new(subscriber));
        debug!(%id, subscribers = self.subscribers.len(), "Subscriber registered");
        id
    }

    /// Remove a subscriber. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.remove(id);
        debug!(%id, removed, "Subscriber removed");
        removed
    }

    /// Number of registered subscribers.
    pub const fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // -----------------------------------------------------------------------
    // Apply operations
    // -----------------------------------------------------------------------

    /// Apply a [`Mutation`] to one event and notify subscribers.
    ///
    /// Creates the namespace and key if absent. Returns the new value.
    pub fn apply(&mut self, key: &str, namespace: &str, mutation: Mutation) -> i64 {
        let events = self.events.entry(namespace.to_owned()).or_default();
        let value = mutation.resolve(events.get(key).copied());
        events.insert(key.to_owned(), value);

        self.subscribers
            .broadcast(&EventRecord::new(key, namespace, value));
        value
    }

    /// Record one occurrence: `1` if absent, otherwise incremented by one.
    pub fn save(&mut self, key: &str, namespace: &str) -> i64 {
        self.apply(key, namespace, Mutation::Increment)
    }

    /// Add `amount`: `amount` if absent, otherwise incremented by it.
    pub fn add_to(&mut self, key: &str, amount: i64, namespace: &str) -> i64 {
        self.apply(key, namespace, Mutation::Add(amount))
    }

    /// Subtract `amount`: `-amount` if absent, otherwise decremented by it.
    pub fn remove_from(&mut self, key: &str, amount: i64, namespace: &str) -> i64 {
        self.apply(key, namespace, Mutation::Subtract(amount))
    }

    /// Set the value to `amount`, whatever it was before.
    pub fn set_value(&mut self, key: &str, amount: i64, namespace: &str) -> i64 {
        self.apply(key, namespace, Mutation::Set(amount))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current value of an event, or `0` if the key or namespace is absent.
    pub fn get(&self, key: &str, namespace: &str) -> i64 {
        self.events
            .get(namespace)
            .and_then(|events| events.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Whether an event is present with a non-zero value.
    pub fn has_value(&self, key: &str, namespace: &str) -> bool {
        self.get(key, namespace) != 0
    }

    /// Whether a namespace currently exists, even if all its values are zero.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.events.contains_key(namespace)
    }

    /// Existing namespace names, in order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Number of existing namespaces.
    pub fn namespace_count(&self) -> usize {
        self.events.len()
    }

    /// Whether no namespace exists.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // -----------------------------------------------------------------------
    // Clears
    // -----------------------------------------------------------------------

    /// Remove a namespace and everything in it.
    ///
    /// Each key of the namespace is reported with a value of `0`, in the
    /// order the keys were created, before the namespace is removed. The
    /// remaining namespaces keep their order. Returns `false` without
    /// notifying anyone if the namespace does not exist.
    pub fn clear_namespace(&mut self, namespace: &str) -> bool {
        let Some(events) = self.events.get(namespace) else {
            debug!(namespace, "Clear requested for unknown namespace");
            return false;
        };

        for key in events.keys() {
            self.subscribers
                .broadcast(&EventRecord::new(key.as_str(), namespace, 0));
        }
        let removed = self.events.shift_remove(namespace);
        debug!(
            namespace,
            cleared = removed.as_ref().map_or(0, IndexMap::len),
            "Namespace cleared"
        );
        removed.is_some()
    }

    /// Remove every namespace.
    ///
    /// Every key is reported with a value of `0`, namespaces in creation
    /// order and keys in creation order within each, before anything is
    /// removed.
    pub fn clear_all(&mut self) {
        for (namespace, events) in &self.events {
            for key in events.keys() {
                self.subscribers
                    .broadcast(&EventRecord::new(key.as_str(), namespace.as_str(), 0));
            }
        }
        debug!(namespaces = self.events.len(), "All events cleared");
        self.events.clear();
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Copy out the full state for a persistence layer.
    ///
    /// The snapshot is detached: changing it does not change the registry.
    /// Nobody is notified.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::from(self.events.clone())
    }

    /// Replace the full state, typically with data from a persistence layer.
    ///
    /// Everything currently stored is discarded without notification and
    /// every value of the new data is reported in the snapshot's own order.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) {
        for record in snapshot.records() {
            self.subscribers.broadcast(&record);
        }
        debug!(
            namespaces = snapshot.as_map().len(),
            events = snapshot.event_count(),
            "Snapshot imported"
        );
        self.events = snapshot.into_inner();
    }
}
