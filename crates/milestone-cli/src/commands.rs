//! Subcommands and their execution against a registry.
//!
//! Each subcommand maps onto exactly one registry operation. Execution
//! returns the text to print; persisting the result is left to `main`,
//! which writes the snapshot back when [`Command::is_mutating`] holds.

use std::path::PathBuf;

use clap::Subcommand;
use milestone_events::EventRegistry;

use crate::error::CliError;
use crate::store::read_snapshot;

/// A single registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Record one occurrence of an event (1 if new, otherwise +1)
    Save {
        /// Event key
        key: String,
    },

    /// Add an amount to an event
    Add {
        /// Event key
        key: String,
        /// Amount to add
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Subtract an amount from an event
    Remove {
        /// Event key
        key: String,
        /// Amount to subtract
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Set an event to an exact value
    Set {
        /// Event key
        key: String,
        /// New value
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Print the value of an event (0 if absent)
    Get {
        /// Event key
        key: String,
    },

    /// Print whether an event has a non-zero value
    Has {
        /// Event key
        key: String,
    },

    /// Remove a namespace and all of its events
    ClearNamespace {
        /// Namespace to remove
        #[arg(value_name = "NAMESPACE")]
        name: String,
    },

    /// Remove every event in every namespace
    ClearAll,

    /// Print the full snapshot as JSON
    Export,

    /// Replace all events with the contents of a snapshot file
    Import {
        /// JSON snapshot file to import
        file: PathBuf,
    },
}

impl Command {
    /// Whether the command changes registry state.
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::Get { .. } | Self::Has { .. } | Self::Export)
    }

    /// Run the command against `registry`, using `namespace` for keyed
    /// operations. Returns the text to print, possibly empty.
    pub fn execute(&self, registry: &mut EventRegistry, namespace: &str) -> Result<String, CliError> {
        let output = match self {
            Self::Save { key } => registry.save(key, namespace).to_string(),
            Self::Add { key, amount } => registry.add_to(key, *amount, namespace).to_string(),
            Self::Remove { key, amount } => {
                registry.remove_from(key, *amount, namespace).to_string()
            }
            Self::Set { key, amount } => registry.set_value(key, *amount, namespace).to_string(),
            Self::Get { key } => registry.get(key, namespace).to_string(),
            Self::Has { key } => registry.has_value(key, namespace).to_string(),
            Self::ClearNamespace { name } => registry.clear_namespace(name).to_string(),
            Self::ClearAll => {
                registry.clear_all();
                String::new()
            }
            Self::Export => serde_json::to_string_pretty(&registry.export_snapshot())?,
            Self::Import { file } => {
                let snapshot = read_snapshot(file)?;
                let count = snapshot.event_count();
                registry.import_snapshot(snapshot);
                format!("imported {count} events")
            }
        };
        Ok(output)
    }
}
