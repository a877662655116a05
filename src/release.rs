//! Release and asset records as reported by the hosting service.
//!
//! The records are plain data: the release lister fills them in and the
//! synchronisation engine only reads them. [`RepoId`] is the validated
//! `owner/name` identifier used to address a repository.

use crate::error::ConfigurationError;
use std::fmt;
use std::str::FromStr;

/// A validated `owner/name` repository identifier.
///
/// # Examples
///
/// ```
/// use art_keeper::release::RepoId;
///
/// let repo: RepoId = "acme/tool".parse().expect("valid repository id");
/// assert_eq!(repo.owner(), "acme");
/// assert_eq!(repo.name(), "tool");
/// assert_eq!(repo.to_string(), "acme/tool");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Return the owning user or organisation.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Return the short repository name.
    ///
    /// This is the component the name normaliser searches for in asset names.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepoId {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigurationError::InvalidRepoId {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };

        let (owner, name) = value
            .trim()
            .split_once('/')
            .ok_or_else(|| invalid("expected the form owner/name"))?;
        if owner.is_empty() || name.is_empty() {
            return Err(invalid("owner and name must both be non-empty"));
        }
        if name.contains('/') {
            return Err(invalid("expected exactly one '/' separator"));
        }

        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }
}

impl TryFrom<&str> for RepoId {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File name, unique within its release.
    pub name: String,
    /// Location the file can be fetched from.
    pub download_url: String,
    /// Size in bytes as reported by the host. Informational only.
    pub size: u64,
}

impl Asset {
    /// Create an asset record.
    #[must_use]
    pub fn new(name: impl Into<String>, download_url: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            size,
        }
    }
}

/// A tagged, published set of assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Tag the release was published under, e.g. `v1.2.0`.
    pub tag_name: String,
    /// Publication timestamp as reported by the host, when known.
    pub published_at: Option<String>,
    /// Assets in the order the host listed them.
    pub assets: Vec<Asset>,
}

impl Release {
    /// Create a release record without a publication timestamp.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            tag_name: tag_name.into(),
            published_at: None,
            assets,
        }
    }
}
