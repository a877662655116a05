//! Error types for the mirror application.
//!
//! Everything here is fatal to a run: the binary prints the error and exits
//! with status 1. Per-release and per-asset failures never surface as a
//! [`MirrorError`]; the engine records them in its report instead.

use art_keeper::ConfigurationError;
use art_keeper::sync::SyncError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The configuration file could not be read or parsed.
    #[error("failed to load configuration from {path}: {reason}")]
    ConfigFile {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A configured repository or filter is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A setting required for a real run was not provided.
    #[error("missing {setting}; pass {flag} or set {env}")]
    MissingSetting {
        /// Human-readable setting name.
        setting: &'static str,
        /// Command-line flag that supplies it.
        flag: &'static str,
        /// Environment variable that supplies it.
        env: &'static str,
    },

    /// No data directory was given and none could be derived.
    #[error("could not determine a data directory; pass --data-dir or set DATA_DIR")]
    DataDirUnavailable,

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the rejected path.
        path: String,
    },

    /// The scratch directory cannot be created or written to.
    #[error("scratch directory {path} is not writable: {reason}")]
    ScratchNotWritable {
        /// Path of the scratch directory.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// Another run holds the scratch directory lock.
    #[error("another art-keeper run holds the lock at {path}")]
    Locked {
        /// Path of the lock file.
        path: Utf8PathBuf,
    },

    /// The object store client could not be set up.
    #[error("failed to initialise object store client: {reason}")]
    StoreSetup {
        /// Description of the failure.
        reason: String,
    },

    /// The run could not proceed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`MirrorError`].
pub type Result<T> = std::result::Result<T, MirrorError>;
