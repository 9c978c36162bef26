//! Error types for the retention engine.

use keepinv_core::{ContainerKind, InventoryError};
use thiserror::Error;

/// Failures below the hook boundary.
#[derive(Debug, Error)]
pub enum RetentionError {
    /// Reading a container while building a snapshot failed.
    #[error("failed to capture {kind}: {source}")]
    Capture {
        /// Container being captured.
        kind: ContainerKind,
        /// Underlying inventory failure.
        #[source]
        source: InventoryError,
    },
    /// Writing a restored slot failed.
    #[error("failed to restore {kind}: {source}")]
    Restore {
        /// Container being restored.
        kind: ContainerKind,
        /// Underlying inventory failure.
        #[source]
        source: InventoryError,
    },
    /// Any other inventory failure.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    /// The config file is not valid TOML for [`crate::RetentionConfig`].
    #[error("failed to parse keep-inventory config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// The config could not be encoded.
    #[error("failed to encode keep-inventory config: {0}")]
    ConfigEncode(toml::ser::Error),
    /// The preference file could not be read or written as JSON.
    #[error("invalid preference file: {0}")]
    Preferences(#[from] serde_json::Error),
    /// File-system failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type RetentionResult<T> = Result<T, RetentionError>;
