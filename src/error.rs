//! Configuration errors raised while preparing a synchronisation run.
//!
//! Every variant describes malformed declarative input. They surface before
//! any release is listed or any transfer starts, so callers can report them
//! separately from the per-release and per-asset failures the engine logs.

use thiserror::Error;

/// Errors arising from invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A repository identifier is not of the form `owner/name`.
    #[error("invalid repository \"{value}\": {reason}")]
    InvalidRepoId {
        /// The rejected identifier.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A filter descriptor names a filter type that does not exist.
    #[error("filter type \"{kind}\" does not exist; expected one of: {expected}")]
    UnknownFilterType {
        /// The rejected filter type tag.
        kind: String,
        /// Comma-separated list of accepted filter types.
        expected: String,
    },

    /// A filter descriptor value does not resolve to a member of its table.
    #[error("{kind} \"{value}\" does not exist; expected one of: {expected}")]
    UnknownFilterValue {
        /// The filter type whose table was searched.
        kind: &'static str,
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted aliases.
        expected: String,
    },

    /// A regex filter pattern failed to compile.
    #[error("invalid regex filter \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The compiler's description of the failure.
        reason: String,
    },
}

/// Result type alias using [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;
