//! Error types for chimpsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::OrderId;

/// All errors that can arise while selecting candidate orders.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The `created-since` input is not a recognizable date/time.
    #[error("invalid created-since value '{input}': {reason}")]
    InvalidFilter { input: String, reason: String },

    /// Underlying SQLite failure (open, prepare, query).
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be mapped onto the domain model.
    #[error("corrupt order row {order_id}: {reason}")]
    CorruptRow { order_id: OrderId, reason: String },
}

/// All errors that can arise from config resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.chimpsync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A required setting is absent from both the file and the overrides.
    #[error("missing required setting '{0}'")]
    Missing(&'static str),
}
