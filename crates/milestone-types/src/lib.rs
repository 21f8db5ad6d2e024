//! Shared type definitions for the Milestone event registry.
//!
//! These types cross the boundary between the registry and its external
//! collaborators: persistence layers consume a [`Snapshot`], UI and game
//! logic receive an [`EventRecord`] for every value change. Both flow
//! downstream to `TypeScript` via `ts-rs` for dashboard subscribers.
//!
//! # Modules
//!
//! - [`record`] -- The immutable change notification payload
//! - [`snapshot`] -- The nested namespace -> key -> value export shape

pub mod record;
pub mod snapshot;

pub use record::EventRecord;
pub use snapshot::{NamespaceEvents, Snapshot};

/// The namespace used when a caller does not segregate its events.
pub const DEFAULT_NAMESPACE: &str = "";
