//! Core of Art Keeper, a mirror for release artefacts.
//!
//! The crate decides *what* to copy from a code-hosting service into an
//! object store and drives the copy through collaborator traits:
//!
//! - [`checksums`] parses per-release checksum manifests and compares digests
//!   in the hex and base64 forms hosts and stores use.
//! - [`matcher`] and [`filter`] turn `{ type, value }` descriptors into a
//!   conjunction of asset name predicates.
//! - [`naming`] derives the tag-qualified object name an asset is stored
//!   under.
//! - [`store`] declares the release lister, file fetcher, and object store
//!   interfaces the application implements.
//! - [`sync`] is the engine that ties them together.
//!
//! Network clients, configuration files, and the command-line surface live
//! in the `art-keeper-mirror` crate.

pub mod checksums;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod naming;
pub mod release;
pub mod store;
pub mod sync;

pub use error::ConfigurationError;
pub use filter::{Filter, FilterConfig, FilterSequence};
pub use release::{Asset, Release, RepoId};
pub use sync::{SyncError, SyncOptions, SyncReport, Synchroniser};
