//! Mirror configuration file loading.
//!
//! The file lists the repositories to mirror and the filters to apply. YAML
//! is the default format; a file with a `.toml` extension is read as TOML.
//! Unknown keys are rejected so that typos fail loudly. Every repository and
//! filter is validated while loading, before any network call is made.

use crate::error::{MirrorError, Result};
use art_keeper::checksums::ChecksumAlgorithm;
use art_keeper::filter::{FilterConfig, FilterSequence};
use art_keeper::release::RepoId;
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

/// Default configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Raw configuration document as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Repositories in `owner/name` form.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Ordered filter descriptors.
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    /// Algorithm manifest digests use.
    #[serde(default)]
    pub checksum_algorithm: ChecksumAlgorithm,
    /// Whether downloads are hashed before upload.
    #[serde(default = "default_verify_downloads")]
    pub verify_downloads: bool,
}

const fn default_verify_downloads() -> bool {
    true
}

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML, the default.
    Yaml,
    /// TOML, selected by a `.toml` extension.
    Toml,
}

impl ConfigFormat {
    /// Choose the format from a file extension.
    #[must_use]
    pub fn for_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Validated configuration ready to drive a run.
#[derive(Debug)]
pub struct MirrorConfig {
    /// Repositories to mirror, in file order.
    pub repos: Vec<RepoId>,
    /// Filter sequence built from the descriptors.
    pub filters: FilterSequence,
    /// Algorithm manifest digests and stored checksums are compared with.
    pub algorithm: ChecksumAlgorithm,
    /// Whether downloads are hashed before upload.
    pub verify_downloads: bool,
}

impl MirrorConfig {
    /// Validate a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Configuration`] for the first invalid
    /// repository identifier or filter descriptor.
    pub fn from_file(file: &ConfigFile) -> Result<Self> {
        let repos = file
            .repos
            .iter()
            .map(|repo| repo.parse::<RepoId>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let filters = FilterSequence::from_config(&file.filters)?;
        Ok(Self {
            repos,
            filters,
            algorithm: file.checksum_algorithm,
            verify_downloads: file.verify_downloads,
        })
    }
}

/// Parse configuration text in the given format.
///
/// # Errors
///
/// Returns the parser's message when the document is malformed or contains
/// unknown keys.
pub fn parse_config(content: &str, format: ConfigFormat) -> std::result::Result<ConfigFile, String> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Read, parse, and validate the configuration file at `path`.
///
/// # Errors
///
/// Returns [`MirrorError::ConfigFile`] if the file cannot be read or parsed,
/// or [`MirrorError::Configuration`] if a repository or filter is invalid.
pub fn load_config(path: &Utf8Path) -> Result<MirrorConfig> {
    let content = fs::read_to_string(path).map_err(|e| MirrorError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let file = parse_config(&content, ConfigFormat::for_path(path)).map_err(|reason| {
        MirrorError::ConfigFile {
            path: path.to_path_buf(),
            reason,
        }
    })?;
    let config = MirrorConfig::from_file(&file)?;
    if config.repos.is_empty() {
        log::warn!("configuration at {path} lists no repositories");
    }
    log::debug!(
        "loaded configuration from {path}: {} repo(s), {} filter(s), algorithm={}",
        config.repos.len(),
        config.filters.len(),
        config.algorithm
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_keeper::ConfigurationError;
    use art_keeper::filter::Filter;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    const YAML: &str = "\
repos:
  - acme/tool
  - acme/other
filters:
  - type: platform
    value: linux
  - type: arch
    value: x86_64
";

    fn write_config(name: &str, content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join(name)).expect("UTF-8 path");
        fs::write(&path, content).expect("write config");
        (dir, path)
    }

    #[test]
    fn loads_yaml_configuration() {
        let (_dir, path) = write_config(CONFIG_FILE_NAME, YAML);
        let config = load_config(&path).expect("valid configuration");

        assert_eq!(config.repos.len(), 2);
        assert_eq!(config.repos.first().map(ToString::to_string).as_deref(), Some("acme/tool"));
        assert_eq!(config.filters.len(), 2);
        assert!(config.filters.passes("tool-linux-amd64"));
        assert!(!config.filters.passes("tool-linux-arm64"));
        assert_eq!(config.algorithm, ChecksumAlgorithm::Sha256);
        assert!(config.verify_downloads);
    }

    #[test]
    fn loads_toml_configuration() {
        let document = "\
repos = [\"acme/tool\"]
checksum_algorithm = \"sha1\"
verify_downloads = false

[[filters]]
type = \"extension\"
value = \"deb\"
";
        let (_dir, path) = write_config("config.toml", document);
        let config = load_config(&path).expect("valid configuration");

        assert_eq!(config.repos.len(), 1);
        assert_eq!(config.algorithm, ChecksumAlgorithm::Sha1);
        assert!(!config.verify_downloads);
        assert!(config.filters.passes("tool_1.0_amd64.deb"));
    }

    #[rstest]
    #[case("config.yaml", ConfigFormat::Yaml)]
    #[case("config.yml", ConfigFormat::Yaml)]
    #[case("config.TOML", ConfigFormat::Toml)]
    #[case("config", ConfigFormat::Yaml)]
    fn format_follows_extension(#[case] name: &str, #[case] expected: ConfigFormat) {
        assert_eq!(ConfigFormat::for_path(Utf8Path::new(name)), expected);
    }

    #[test]
    fn empty_document_fields_default() {
        let file = parse_config("repos: []\n", ConfigFormat::Yaml).expect("valid");
        assert!(file.filters.is_empty());
        assert_eq!(file.checksum_algorithm, ChecksumAlgorithm::Sha256);
        assert!(file.verify_downloads);
    }

    #[rstest]
    #[case::unknown_top_level_key("repos: []\nbucket: x\n")]
    #[case::unknown_filter_key("filters:\n  - type: arch\n    value: arm64\n    extra: 1\n")]
    #[case::unknown_algorithm("checksum_algorithm: md5\n")]
    fn rejects_malformed_documents(#[case] content: &str) {
        let (_dir, path) = write_config(CONFIG_FILE_NAME, content);
        let err = load_config(&path).expect_err("malformed document");
        assert!(matches!(err, MirrorError::ConfigFile { .. }), "unexpected: {err:?}");
    }

    #[rstest]
    #[case::bad_repo("repos:\n  - not-a-repo\n")]
    #[case::unknown_filter_type("filters:\n  - type: colour\n    value: blue\n")]
    #[case::unknown_filter_value("filters:\n  - type: platform\n    value: win\n")]
    fn rejects_invalid_values(#[case] content: &str) {
        let (_dir, path) = write_config(CONFIG_FILE_NAME, content);
        let err = load_config(&path).expect_err("invalid value");
        assert!(
            matches!(err, MirrorError::Configuration(_)),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn invalid_repo_reports_its_value() {
        let file = ConfigFile {
            repos: vec!["acme".to_owned()],
            filters: Vec::new(),
            checksum_algorithm: ChecksumAlgorithm::Sha256,
            verify_downloads: true,
        };
        let err = MirrorConfig::from_file(&file).expect_err("invalid repo");
        assert!(
            matches!(
                err,
                MirrorError::Configuration(ConfigurationError::InvalidRepoId { ref value, .. })
                    if value == "acme"
            ),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn missing_file_is_a_config_file_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join("absent.yaml")).expect("UTF-8 path");
        let err = load_config(&path).expect_err("missing file");
        assert!(matches!(err, MirrorError::ConfigFile { .. }));
    }
}
