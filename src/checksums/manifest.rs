//! Checksum manifest parsing.
//!
//! A manifest is the plain-text companion asset a release publishes to list
//! the expected digest of every sibling asset. The accepted format is the one
//! `sha256sum` and `shasum` emit:
//!
//! ```text
//! <hex digest><whitespace><file name>
//! ```
//!
//! - Fields are separated by any run of whitespace; the file name is the rest
//!   of the line, trimmed, so names containing spaces survive.
//! - A leading `*` on the file name (the binary-mode marker) is dropped.
//! - Blank lines are ignored.
//! - A line with only one field, or whose digest is not hex, aborts the parse
//!   with [`ManifestError::Parse`]. No partial manifest is returned.
//! - When a file name repeats, the last line wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use super::digest::{ChecksumAlgorithm, Digest, DigestError};

/// Asset names recognised as the checksum manifest, in priority order.
pub const MANIFEST_ASSET_NAMES: &[&str] = &["CHECKSUMS", "checksums"];

/// Errors arising from locating, reading, or parsing a checksum manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The release carries no asset with a recognised manifest name.
    #[error("release {tag} has no checksum manifest (looked for {expected})")]
    Missing {
        /// Tag of the release that was searched.
        tag: String,
        /// Comma-separated list of recognised manifest names.
        expected: String,
    },

    /// The manifest could not be fetched from the host.
    #[error("failed to fetch checksum manifest: {reason}")]
    Fetch {
        /// Description of the fetch failure.
        reason: String,
    },

    /// The manifest content could not be read.
    #[error("failed to read checksum manifest: {0}")]
    Read(#[from] io::Error),

    /// A manifest line is malformed.
    #[error("malformed checksum manifest line {line}: {reason}")]
    Parse {
        /// One-based line number of the offending line.
        line: usize,
        /// Description of what is wrong with the line.
        reason: String,
    },
}

/// Mapping from asset file name to its published hex digest.
///
/// # Examples
///
/// ```
/// use art_keeper::checksums::ChecksumManifest;
///
/// let manifest = ChecksumManifest::parse("abc123 tool-linux-amd64\n")
///     .expect("valid manifest");
/// assert_eq!(manifest.get("tool-linux-amd64"), Some("abc123"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, String>,
}

/// Leading marker some Windows tools write before UTF-8 text.
const BYTE_ORDER_MARK: char = '\u{feff}';

impl ChecksumManifest {
    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for the first malformed line.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let body = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
        let mut entries = BTreeMap::new();
        for (index, raw_line) in body.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let (hash, name) = split_record(line).map_err(|reason| ManifestError::Parse {
                line: index + 1,
                reason,
            })?;
            entries.insert(name.to_owned(), hash.to_ascii_lowercase());
        }
        Ok(Self { entries })
    }

    /// Read and parse the manifest stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read, or
    /// [`ManifestError::Parse`] if its content is malformed.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Return the hex digest recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Decode the digest recorded for `name` for the given algorithm.
    ///
    /// Returns `None` when the manifest has no entry for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the recorded digest does not have the length
    /// `algorithm` produces, which means the manifest was generated with a
    /// different hash than the one configured.
    pub fn digest_for(
        &self,
        name: &str,
        algorithm: ChecksumAlgorithm,
    ) -> Option<Result<Digest, DigestError>> {
        self.get(name).map(|hex| Digest::from_hex(algorithm, hex))
    }

    /// Return the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(file name, hex digest)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Split a trimmed, non-empty line into its digest and file name.
fn split_record(line: &str) -> Result<(&str, &str), String> {
    let Some((hash, rest)) = line.split_once(char::is_whitespace) else {
        return Err(format!("expected \"<digest> <file name>\", got \"{line}\""));
    };
    let field = rest.trim_start();
    let name = field.strip_prefix('*').unwrap_or(field);
    if name.is_empty() {
        return Err(format!("missing file name after digest \"{hash}\""));
    }
    if let Some(bad) = hash.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(format!("digest \"{hash}\" contains non-hex character '{bad}'"));
    }
    Ok((hash, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_hash_first_records() {
        let manifest =
            ChecksumManifest::parse("abc123 tool-linux-amd64\ndef456 tool-windows-amd64.exe\n")
                .expect("valid");
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("tool-linux-amd64"), Some("abc123"));
        assert_eq!(manifest.get("tool-windows-amd64.exe"), Some("def456"));
    }

    #[test]
    fn accepts_sha256sum_double_space_and_binary_marker() {
        let manifest = ChecksumManifest::parse("abc123  tool.tar.gz\ndef456 *tool.zip\n")
            .expect("valid");
        assert_eq!(manifest.get("tool.tar.gz"), Some("abc123"));
        assert_eq!(manifest.get("tool.zip"), Some("def456"));
    }

    #[test]
    fn accepts_tabs_and_crlf_line_endings() {
        let manifest = ChecksumManifest::parse("abc123\ttool\r\n").expect("valid");
        assert_eq!(manifest.get("tool"), Some("abc123"));
    }

    #[rstest]
    #[case::lf("\u{feff}abc123  tool-linux-amd64\ndef456  tool.exe\n")]
    #[case::crlf("\u{feff}abc123  tool-linux-amd64\r\ndef456  tool.exe\r\n")]
    fn skips_leading_byte_order_mark(#[case] input: &str) {
        let manifest = ChecksumManifest::parse(input).expect("parses");
        assert_eq!(manifest.get("tool-linux-amd64"), Some("abc123"));
        assert_eq!(manifest.get("tool.exe"), Some("def456"));
    }

    #[test]
    fn byte_order_mark_inside_the_text_is_rejected() {
        let err = ChecksumManifest::parse("abc123  tool\n\u{feff}def456  tool.exe\n")
            .expect_err("marker mid-file");
        assert!(matches!(err, ManifestError::Parse { line: 2, .. }));
    }

    #[test]
    fn keeps_inner_spaces_in_file_names() {
        let manifest = ChecksumManifest::parse("abc123 my tool.zip").expect("valid");
        assert_eq!(manifest.get("my tool.zip"), Some("abc123"));
    }

    #[test]
    fn ignores_blank_lines() {
        let manifest = ChecksumManifest::parse("\n  \nabc123 tool\n\n").expect("valid");
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn last_duplicate_wins() {
        let manifest = ChecksumManifest::parse("aaa tool\nbbb tool\n").expect("valid");
        assert_eq!(manifest.get("tool"), Some("bbb"));
    }

    #[test]
    fn lowercases_digests() {
        let manifest = ChecksumManifest::parse("ABC123 tool").expect("valid");
        assert_eq!(manifest.get("tool"), Some("abc123"));
    }

    #[test]
    fn empty_input_gives_empty_manifest() {
        let manifest = ChecksumManifest::parse("").expect("valid");
        assert!(manifest.is_empty());
    }

    #[rstest]
    #[case::single_field("abc123 tool\nlonely\n", 2)]
    #[case::non_hex_digest("abc123 tool\nxyz tool2\n", 2)]
    #[case::name_first("tool-linux-amd64 abc123\n", 1)]
    #[case::marker_only("abc123 *\n", 1)]
    fn aborts_on_first_malformed_line(#[case] input: &str, #[case] expected_line: usize) {
        let err = ChecksumManifest::parse(input).expect_err("expected parse failure");
        match err {
            ManifestError::Parse { line, .. } => assert_eq!(line, expected_line),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn from_path_reports_missing_file_as_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ChecksumManifest::from_path(&dir.path().join("CHECKSUMS"))
            .expect_err("missing file");
        assert!(matches!(err, ManifestError::Read(_)));
    }

    #[test]
    fn from_path_parses_file_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("CHECKSUMS");
        fs::write(&path, "abc123 tool\n").expect("write manifest");
        let manifest = ChecksumManifest::from_path(&path).expect("valid");
        assert_eq!(manifest.get("tool"), Some("abc123"));
    }

    #[test]
    fn digest_for_rejects_wrong_algorithm_length() {
        let manifest = ChecksumManifest::parse(&format!("{} tool", "a".repeat(40))).expect("valid");
        let result = manifest
            .digest_for("tool", ChecksumAlgorithm::Sha256)
            .expect("entry present");
        assert!(result.is_err());
        assert!(manifest.digest_for("other", ChecksumAlgorithm::Sha256).is_none());
    }
}
