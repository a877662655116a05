//! Asset name filters and their declarative configuration.
//!
//! A [`Filter`] decides whether an asset name should be mirrored. Filters are
//! built once per run from an ordered list of [`FilterConfig`] descriptors and
//! combined by [`FilterSequence`], which passes a name only when every member
//! filter does. Unknown filter types, unresolvable values, and invalid
//! patterns are rejected while the sequence is built, never while filtering.

use crate::error::{ConfigurationError, Result};
use crate::matcher::{Arch, Extension, NameMatcher, Platform};
use regex::Regex;
use serde::Deserialize;
use std::fmt;

/// Filter type tags accepted in configuration.
pub const FILTER_TYPES: &[&str] = &["arch", "platform", "extension", "regex"];

/// A predicate over asset names.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Return whether `name` should be kept.
    fn passes(&self, name: &str) -> bool;
}

/// One `{ type, value }` filter descriptor.
///
/// # Examples
///
/// ```
/// use art_keeper::filter::FilterConfig;
///
/// let config = FilterConfig::new("platform", "linux");
/// assert_eq!(config.kind, "platform");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Filter type tag, one of [`FILTER_TYPES`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific value: an alias for table filters, a pattern for `regex`.
    pub value: String,
}

impl FilterConfig {
    /// Create a descriptor.
    #[must_use]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Passes names containing any alias of one alias-table member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherFilter<M: NameMatcher> {
    member: M,
}

impl<M: NameMatcher> MatcherFilter<M> {
    /// Wrap an already resolved member.
    #[must_use]
    pub const fn new(member: M) -> Self {
        Self { member }
    }

    /// Resolve a configured token against the table of `M`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownFilterValue`] when no member has
    /// `token` as an alias.
    pub fn from_token(token: &str) -> Result<Self> {
        M::resolve(token)
            .map(Self::new)
            .ok_or_else(|| ConfigurationError::UnknownFilterValue {
                kind: M::KIND,
                value: token.to_owned(),
                expected: M::expected_tokens(),
            })
    }

    /// Return the member this filter selects.
    #[must_use]
    pub const fn member(&self) -> M {
        self.member
    }
}

impl<M: NameMatcher + Send + Sync> Filter for MatcherFilter<M> {
    fn passes(&self, name: &str) -> bool {
        self.member.contained_in(name)
    }
}

/// Passes names matching a regular expression anywhere.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: Regex,
}

impl RegexFilter {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] when the pattern does
    /// not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|compiled| Self { pattern: compiled })
            .map_err(|e| ConfigurationError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl Filter for RegexFilter {
    fn passes(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Ordered conjunction of filters.
///
/// An empty sequence passes every name.
///
/// # Examples
///
/// ```
/// use art_keeper::filter::{Filter, FilterConfig, FilterSequence};
///
/// let sequence = FilterSequence::from_config(&[
///     FilterConfig::new("platform", "linux"),
///     FilterConfig::new("arch", "amd64"),
/// ])
/// .expect("valid filters");
///
/// assert!(sequence.passes("tool-linux-amd64"));
/// assert!(!sequence.passes("tool-linux-arm64"));
/// ```
#[derive(Debug, Default)]
pub struct FilterSequence {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterSequence {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence from descriptors, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] any descriptor produces.
    pub fn from_config(configs: &[FilterConfig]) -> Result<Self> {
        let filters = configs
            .iter()
            .map(filter_from_config)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { filters })
    }

    /// Append a filter.
    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Return the number of member filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Return whether the sequence has no member filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for FilterSequence {
    fn passes(&self, name: &str) -> bool {
        self.filters.iter().all(|filter| filter.passes(name))
    }
}

fn filter_from_config(config: &FilterConfig) -> Result<Box<dyn Filter>> {
    let filter: Box<dyn Filter> = match config.kind.as_str() {
        "arch" => Box::new(MatcherFilter::<Arch>::from_token(&config.value)?),
        "platform" => Box::new(MatcherFilter::<Platform>::from_token(&config.value)?),
        "extension" => Box::new(MatcherFilter::<Extension>::from_token(&config.value)?),
        "regex" => Box::new(RegexFilter::new(&config.value)?),
        other => {
            return Err(ConfigurationError::UnknownFilterType {
                kind: other.to_owned(),
                expected: FILTER_TYPES.join(", "),
            });
        }
    };
    Ok(filter)
}
