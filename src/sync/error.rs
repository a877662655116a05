//! Error types for the synchronisation engine.
//!
//! Only [`SyncError::Bucket`] aborts a run. Release listing failures are
//! scoped to one repository, and [`TransferError`] and [`VerificationError`]
//! to one asset; the engine records those and moves on.

use crate::checksums::DigestError;
use crate::store::{FetchError, ListError, StoreError};
use thiserror::Error;

/// Failure to copy one asset to the destination.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The asset could not be downloaded to scratch space.
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    /// The asset could not be uploaded.
    #[error("upload failed: {0}")]
    Upload(#[from] StoreError),

    /// The downloaded file could not be hashed.
    #[error("checksum computation failed: {0}")]
    Hash(#[from] DigestError),

    /// The downloaded file does not match the manifest.
    #[error("checksum mismatch: manifest={expected}, actual={actual}")]
    ChecksumMismatch {
        /// Digest recorded in the manifest.
        expected: String,
        /// Digest of the downloaded file.
        actual: String,
    },
}

/// Failure to determine whether an asset is already mirrored.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The destination could not be queried.
    #[error("destination lookup failed: {0}")]
    Lookup(#[from] StoreError),

    /// The manifest has no entry for the asset.
    #[error("checksum manifest has no entry for {asset}")]
    MissingDigest {
        /// Original asset name.
        asset: String,
    },

    /// The manifest entry is not a usable digest for the configured
    /// algorithm.
    #[error("checksum manifest entry for {asset} is unusable: {source}")]
    InvalidDigest {
        /// Original asset name.
        asset: String,
        /// Decoding failure.
        source: DigestError,
    },
}

/// Errors that stop synchronisation of a repository or of the whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The destination bucket could not be checked or created.
    #[error("destination bucket unavailable: {0}")]
    Bucket(#[source] StoreError),

    /// The releases of a repository could not be listed.
    #[error("failed to list releases of {repo}: {source}")]
    ListReleases {
        /// Repository being synchronised.
        repo: String,
        /// Listing failure.
        source: ListError,
    },
}
