//! Checksum manifests and digests.
//!
//! - [`manifest`] parses the per-release manifest asset into a
//!   name-to-digest map.
//! - [`digest`] decodes hex and base64 digests and hashes local files.

pub mod digest;
pub mod manifest;

pub use digest::{ChecksumAlgorithm, Digest, DigestError, compute_file_digest};
pub use manifest::{ChecksumManifest, MANIFEST_ASSET_NAMES, ManifestError};
