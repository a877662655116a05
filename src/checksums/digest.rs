//! Checksum digests and the algorithms that produce them.
//!
//! Manifests publish digests as lowercase hex while object stores such as S3
//! report them base64-encoded. [`Digest`] holds the raw bytes tagged with
//! their [`ChecksumAlgorithm`] so both encodings compare equal, and a digest of
//! the wrong length for its algorithm is rejected when it is constructed.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Hash algorithm used to compare manifest entries with stored objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    /// SHA-256, the `sha256sum` convention.
    #[default]
    Sha256,
    /// SHA-1, as published by older release pipelines.
    Sha1,
}

impl ChecksumAlgorithm {
    /// Return the digest length in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha1 => 20,
        }
    }

    /// Return the lowercase algorithm name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = DigestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            _ => Err(DigestError::UnknownAlgorithm {
                value: value.to_owned(),
            }),
        }
    }
}

/// Errors arising from digest decoding or computation.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The algorithm name is not supported.
    #[error("unknown checksum algorithm \"{value}\"; expected sha256 or sha1")]
    UnknownAlgorithm {
        /// The rejected name.
        value: String,
    },

    /// A hex-encoded digest could not be decoded.
    #[error("invalid hex digest \"{value}\": {reason}")]
    InvalidHex {
        /// The rejected string.
        value: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A base64-encoded digest could not be decoded.
    #[error("invalid base64 digest \"{value}\": {reason}")]
    InvalidBase64 {
        /// The rejected string.
        value: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// The decoded digest does not have the algorithm's length.
    #[error("{algorithm} digest must be {expected} bytes, got {actual}")]
    WrongLength {
        /// Algorithm the digest was decoded for.
        algorithm: ChecksumAlgorithm,
        /// Expected length in bytes.
        expected: usize,
        /// Decoded length in bytes.
        actual: usize,
    },

    /// The file to hash could not be read.
    #[error("failed to hash file: {0}")]
    Io(#[from] io::Error),
}

/// A checksum digest tagged with the algorithm that produced it.
///
/// # Examples
///
/// ```
/// use art_keeper::checksums::{ChecksumAlgorithm, Digest};
///
/// let hex = "a".repeat(64);
/// let digest = Digest::from_hex(ChecksumAlgorithm::Sha256, &hex).expect("valid digest");
/// let reparsed = Digest::from_base64(ChecksumAlgorithm::Sha256, &digest.to_base64())
///     .expect("valid base64");
/// assert_eq!(digest, reparsed);
/// assert_eq!(reparsed.to_hex(), hex);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: ChecksumAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    /// Decode a hex digest, accepting either letter case.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not hex or has the wrong length for
    /// `algorithm`.
    pub fn from_hex(algorithm: ChecksumAlgorithm, value: &str) -> Result<Self, DigestError> {
        let bytes = hex::decode(value.trim()).map_err(|e| DigestError::InvalidHex {
            value: value.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(algorithm, bytes)
    }

    /// Decode a standard base64 digest, the form S3 reports checksums in.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not base64 or has the wrong length for
    /// `algorithm`.
    pub fn from_base64(algorithm: ChecksumAlgorithm, value: &str) -> Result<Self, DigestError> {
        let bytes = STANDARD
            .decode(value.trim())
            .map_err(|e| DigestError::InvalidBase64 {
                value: value.to_owned(),
                reason: e.to_string(),
            })?;
        Self::from_bytes(algorithm, bytes)
    }

    /// Wrap raw digest bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::WrongLength`] if the length does not match the
    /// algorithm.
    pub fn from_bytes(algorithm: ChecksumAlgorithm, bytes: Vec<u8>) -> Result<Self, DigestError> {
        if bytes.len() != algorithm.digest_len() {
            return Err(DigestError::WrongLength {
                algorithm,
                expected: algorithm.digest_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self { algorithm, bytes })
    }

    /// Return the algorithm this digest was produced with.
    #[must_use]
    pub const fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Return the raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Encode as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Hash the file at `path` with `algorithm`.
///
/// # Errors
///
/// Returns [`DigestError::Io`] if the file cannot be opened or read.
pub fn compute_file_digest(path: &Path, algorithm: ChecksumAlgorithm) -> Result<Digest, DigestError> {
    let mut file = fs::File::open(path)?;
    let bytes = match algorithm {
        ChecksumAlgorithm::Sha256 => hash_reader::<sha2::Sha256>(&mut file)?,
        ChecksumAlgorithm::Sha1 => hash_reader::<sha1::Sha1>(&mut file)?,
    };
    Digest::from_bytes(algorithm, bytes)
}

fn hash_reader<D>(reader: &mut impl io::Read) -> io::Result<Vec<u8>>
where
    D: sha2::Digest + io::Write,
{
    let mut hasher = D::new();
    io::copy(reader, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}
