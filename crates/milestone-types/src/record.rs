//! Change notification payload.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single value change, as delivered to every subscriber.
///
/// `value` is the value *after* the mutation that produced the record.
/// Clearing a namespace or the whole registry reports each removed key
/// with a value of `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRecord {
    /// The event key within its namespace.
    pub key: String,
    /// The namespace the key lives in. Empty for the default namespace.
    pub namespace: String,
    /// The post-mutation value.
    pub value: i64,
}

impl EventRecord {
    /// Build a record for `key` in `namespace` carrying `value`.
    pub fn new(key: impl Into<String>, namespace: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            namespace: namespace.into(),
            value,
        }
    }
}

impl core::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{} = {}", self.key, self.value)
        } else {
            write!(f, "{}/{} = {}", self.namespace, self.key, self.value)
        }
    }
}
