//! Art Keeper mirror application.
//!
//! This crate supplies the network clients, configuration loading and
//! command-line surface around the `art-keeper` synchronisation core. It is
//! used by the `art-keeper` binary and can be driven programmatically.
//!
//! # Modules
//!
//! - [`app`] - Run orchestration and exit status mapping
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Configuration file loading and validation
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Errors that abort a run
//! - [`fetch`] - HTTP download of release assets
//! - [`github`] - GitHub release listing
//! - [`http`] - Shared HTTP client configuration
//! - [`logging`] - Log subscriber installation
//! - [`s3`] - S3-compatible object store client
//! - [`scratch`] - Scratch directory preparation and run lock

pub mod app;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod fetch;
pub mod github;
pub mod http;
pub mod logging;
pub mod s3;
pub mod scratch;
