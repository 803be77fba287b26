//! Error types for the host binary.
//!
//! [`HostError`] covers everything outside the engine: configuration
//! files, snapshot storage, the action feed, and the settlement bridge.
//! Engine rejections are not host errors; they are logged and the feed
//! moves on.

use std::path::PathBuf;

/// Top-level error for the host binary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The engine section of the configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying engine config error.
        #[from]
        source: homestead_core::ConfigError,
    },

    /// The host configuration file could not be parsed.
    #[error("failed to parse host config YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        #[from]
        source: serde_yml::Error,
    },

    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot error on {path}: {source}")]
    Snapshot {
        /// The snapshot file involved.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The settlement bridge refused a withdrawal.
    #[error("settlement error for sequence {sequence}: {message}")]
    Settlement {
        /// The withdrawal's sequence number.
        sequence: u64,
        /// Description of the failure.
        message: String,
    },
}

impl HostError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
