//! The exported shape of a registry's full state.
//!
//! A [`Snapshot`] is what a persistence layer stores and later hands back.
//! It serializes as a plain nested object:
//!
//! ```text
//! { "<namespace>": { "<key>": <value>, ... }, ... }
//! ```
//!
//! Namespaces keep the order they were first written in, and keys keep the
//! order they were first written in within their namespace. Deserializing
//! keeps the order of the input document. Map semantics make
//! duplicate namespaces or duplicate keys within a namespace unrepresentable,
//! so a snapshot needs no further validation before import.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::record::EventRecord;

/// Events of a single namespace: key -> value.
pub type NamespaceEvents = IndexMap<String, i64>;

/// Full registry state: namespace -> key -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot(IndexMap<String, NamespaceEvents>);

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert a value, creating the namespace if needed.
    ///
    /// Returns the previous value of the key, if any.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: i64,
    ) -> Option<i64> {
        self.0
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value)
    }

    /// Look up a single value.
    pub fn get(&self, namespace: &str, key: &str) -> Option<i64> {
        self.0.get(namespace).and_then(|events| events.get(key)).copied()
    }

    /// Namespace names in order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every stored value as a record, namespaces first, then keys.
    pub fn records(&self) -> impl Iterator<Item = EventRecord> + '_ {
        self.0.iter().flat_map(|(namespace, events)| {
            events
                .iter()
                .map(move |(key, value)| EventRecord::new(key.as_str(), namespace.as_str(), *value))
        })
    }

    /// Total number of keys across all namespaces.
    pub fn event_count(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    /// Whether the snapshot holds no namespaces at all.
    ///
    /// A namespace that is present but holds no keys still counts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying nested map.
    pub const fn as_map(&self) -> &IndexMap<String, NamespaceEvents> {
        &self.0
    }

    /// Take the underlying nested map.
    pub fn into_inner(self) -> IndexMap<String, NamespaceEvents> {
        self.0
    }
}

impl From<IndexMap<String, NamespaceEvents>> for Snapshot {
    fn from(events: IndexMap<String, NamespaceEvents>) -> Self {
        Self(events)
    }
}

impl From<Snapshot> for IndexMap<String, NamespaceEvents> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.0
    }
}

impl FromIterator<EventRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for record in iter {
            snapshot.insert(record.namespace, record.key, record.value);
        }
        snapshot
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("", "event1", 2);
        snapshot.insert("firstNamespace", "event2", 1);
        snapshot.insert("secondNamespace", "event3", 1);
        snapshot
    }

    #[test]
    fn serializes_as_nested_object() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "": { "event1": 2 },
                "firstNamespace": { "event2": 1 },
                "secondNamespace": { "event3": 1 },
            })
        );
    }

    #[test]
    fn deserializes_from_nested_object() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"": {"a": 4}, "ns": {"b": -1, "c": 0}}"#).unwrap();
        assert_eq!(snapshot.get("", "a"), Some(4));
        assert_eq!(snapshot.get("ns", "b"), Some(-1));
        assert_eq!(snapshot.get("ns", "c"), Some(0));
        assert_eq!(snapshot.event_count(), 3);
    }

    #[test]
    fn records_follow_insertion_order() {
        let mut snapshot = sample();
        snapshot.insert("firstNamespace", "alpha", 9);
        let records: Vec<EventRecord> = snapshot.records().collect();
        assert_eq!(
            records,
            vec![
                EventRecord::new("event1", "", 2),
                EventRecord::new("event2", "firstNamespace", 1),
                EventRecord::new("alpha", "firstNamespace", 9),
                EventRecord::new("event3", "secondNamespace", 1),
            ]
        );
    }

    #[test]
    fn deserializing_keeps_document_order() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"z": {"b": 1, "a": 2}, "a": {"x": 3}}"#).unwrap();
        assert_eq!(snapshot.namespaces().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(
            snapshot.records().map(|record| format!("{record}")).collect::<Vec<_>>(),
            vec!["z/b = 1", "z/a = 2", "a/x = 3"]
        );
    }

    #[test]
    fn serializing_keeps_insertion_order() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("zz", "k", 1);
        snapshot.insert("aa", "k", 2);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"zz":{"k":1},"aa":{"k":2}}"#);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut snapshot = Snapshot::new();
        assert_eq!(snapshot.insert("ns", "k", 1), None);
        assert_eq!(snapshot.insert("ns", "k", 5), Some(1));
        assert_eq!(snapshot.get("ns", "k"), Some(5));
    }

    #[test]
    fn collects_from_records() {
        let snapshot: Snapshot = sample().records().collect();
        assert_eq!(snapshot, sample());
    }

    #[test]
    fn empty_namespace_is_not_empty_snapshot() {
        let snapshot = Snapshot::from(IndexMap::from([(String::from("ns"), IndexMap::new())]));
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.event_count(), 0);
        assert_eq!(snapshot.namespaces().collect::<Vec<_>>(), vec!["ns"]);
    }
}
