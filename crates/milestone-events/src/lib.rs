//! In-memory event registry for the Milestone workspace.
//!
//! The registry records integer counters ("events") identified by a key and
//! a namespace, and broadcasts every value change to its subscribers before
//! the mutating call returns. It performs no I/O: persistence layers take a
//! [`Snapshot`] out with [`EventRegistry::export_snapshot`] and hand one back
//! with [`EventRegistry::import_snapshot`].
//!
//! # Architecture
//!
//! - [`registry`] -- The [`EventRegistry`] store, its apply operations,
//!   queries, clears, and snapshot import/export.
//! - [`mutation`] -- The [`Mutation`] primitive shared by every apply
//!   operation (default-on-create plus combinator).
//! - [`subscriber`] -- The [`EventSubscriber`] trait and the ordered
//!   subscriber list.
//! - [`shared`] -- [`SharedEventRegistry`], a cloneable handle that guards a
//!   registry with a single lock for multi-threaded hosts.
//!
//! # Notifications
//!
//! | Operation | Records emitted |
//! |-----------|-----------------|
//! | `save` / `add_to` / `remove_from` / `set_value` | one, carrying the new value |
//! | `clear_namespace` | one per key of the namespace, value `0` |
//! | `clear_all` | one per key of every namespace, value `0` |
//! | `import_snapshot` | one per key of the imported data, its imported value |
//!
//! Delivery is synchronous and in registration order. A slow subscriber
//! slows the caller; a panicking subscriber panics the caller.
//!
//! # Usage
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use milestone_events::EventRegistry;
//! use milestone_types::{DEFAULT_NAMESPACE, EventRecord};
//!
//! let mut registry = EventRegistry::new();
//! let seen = Arc::new(Mutex::new(Vec::<EventRecord>::new()));
//! let sink = Arc::clone(&seen);
//! registry.subscribe(move |record: &EventRecord| {
//!     if let Ok(mut records) = sink.lock() {
//!         records.push(record.clone());
//!     }
//! });
//!
//! registry.save("dragon_slain", DEFAULT_NAMESPACE);
//! registry.add_to("gold_found", 250, "cave");
//!
//! assert_eq!(registry.get("dragon_slain", DEFAULT_NAMESPACE), 1);
//! assert!(registry.has_value("gold_found", "cave"));
//! assert_eq!(seen.lock().map(|r| r.len()).unwrap_or_default(), 2);
//! ```

pub mod mutation;
pub mod registry;
pub mod shared;
pub mod subscriber;

pub use milestone_types::{DEFAULT_NAMESPACE, EventRecord, NamespaceEvents, Snapshot};
pub use mutation::Mutation;
pub use registry::EventRegistry;
pub use shared::SharedEventRegistry;
pub use subscriber::{EventSubscriber, SubscriptionId};
