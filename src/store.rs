//! Collaborator interfaces the synchronisation engine drives.
//!
//! The engine performs no network I/O itself. Listing releases, fetching
//! remote files, and talking to the destination object store are delegated
//! to these traits so that the surrounding application can supply real
//! clients and tests can supply mocks.

use crate::checksums::{ChecksumAlgorithm, Digest};
use crate::release::{Release, RepoId};
use std::path::Path;
use thiserror::Error;

/// Lists the releases of a repository on the hosting service.
///
/// Implementations return releases with their assets populated, in a stable
/// order, and handle any paging or rate limiting themselves.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseLister {
    /// List every release of `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository is unknown or the listing fails.
    fn list_releases(&self, repo: &RepoId) -> Result<Vec<Release>, ListError>;
}

/// Downloads remote files to local paths.
#[cfg_attr(test, mockall::automock)]
pub trait FileFetcher {
    /// Stream `url` into `dest`.
    ///
    /// On failure `dest` must not be left holding partial content.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the local write fails.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Destination bucket operations.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore {
    /// Return whether the destination bucket exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn bucket_exists(&self) -> Result<bool, StoreError>;

    /// Create the destination bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket cannot be created.
    fn create_bucket(&self) -> Result<(), StoreError>;

    /// Look up the object stored under `name`.
    ///
    /// Returns `Ok(None)` when no such object exists. The returned checksum,
    /// when present, was computed with `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or authorisation failures.
    fn stat_object(
        &self,
        name: &str,
        algorithm: ChecksumAlgorithm,
    ) -> Result<Option<StoredObject>, StoreError>;

    /// Upload the file at `local` under `name`, recording `checksum`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the store rejects the
    /// checksum.
    fn put_object(&self, local: &Path, name: &str, checksum: &Digest) -> Result<(), StoreError>;
}

/// Metadata of an object already held by the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    /// Checksum the store recorded for the object, if any.
    pub checksum: Option<Digest>,
}

impl StoredObject {
    /// Describe an object with the given stored checksum.
    #[must_use]
    pub const fn new(checksum: Option<Digest>) -> Self {
        Self { checksum }
    }

    /// Return whether the stored checksum equals `expected`.
    ///
    /// An object without a recorded checksum never matches.
    #[must_use]
    pub fn matches(&self, expected: &Digest) -> bool {
        self.checksum.as_ref() == Some(expected)
    }
}

/// Errors arising from release listing.
#[derive(Debug, Error)]
pub enum ListError {
    /// The repository does not exist or is not visible (HTTP 404).
    #[error("repository not found: {repo}")]
    NotFound {
        /// Repository that was requested.
        repo: String,
    },

    /// The request failed.
    #[error("failed to list releases of {repo}: {reason}")]
    Http {
        /// Repository that was requested.
        repo: String,
        /// Description of the failure.
        reason: String,
    },

    /// The response could not be decoded.
    #[error("failed to decode releases of {repo}: {reason}")]
    Decode {
        /// Repository that was requested.
        repo: String,
        /// Description of the decoding failure.
        reason: String,
    },
}

/// Errors arising from file downloads.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote file does not exist (HTTP 404).
    #[error("remote file not found: {url}")]
    NotFound {
        /// URL that was requested.
        url: String,
    },

    /// The request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// URL that was requested.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The local file could not be written.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors arising from object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request to the store failed.
    #[error("object store request {operation} failed: {reason}")]
    Request {
        /// Store operation that failed, e.g. `put_object`.
        operation: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// The request exceeded its timeout.
    #[error("object store request {operation} timed out")]
    Timeout {
        /// Store operation that timed out.
        operation: &'static str,
    },

    /// The store returned a checksum that could not be decoded.
    #[error("object store returned an unusable checksum: {reason}")]
    InvalidChecksum {
        /// Description of the decoding failure.
        reason: String,
    },

    /// The local file to upload could not be read.
    #[error("I/O error reading upload source: {0}")]
    Io(#[from] std::io::Error),
}
