//! Error types for the `milestone` binary.
//!
//! [`CliError`] wraps every failure mode of running a command so execution
//! can propagate with `?`. Configuration errors surface separately.

/// Top-level error for one `milestone` invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading or writing a snapshot file failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: crate::store::StoreError,
    },

    /// Rendering command output as JSON failed.
    #[error("failed to render output: {source}")]
    Render {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
