//! Platform directory resolution.
//!
//! Wraps `directories-next` behind a trait so callers can substitute fixed
//! paths in tests.

use directories_next::ProjectDirs;
use std::path::PathBuf;

/// Source of per-user base directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Return the per-user data directory for Art Keeper, if the platform
    /// defines one.
    fn data_dir(&self) -> Option<PathBuf>;
}

/// Base directories of the running platform.
///
/// Resolves to `~/.local/share/art-keeper` on most Linux systems,
/// `~/Library/Application Support/art-keeper` on macOS, and the roaming
/// AppData directory on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn data_dir(&self) -> Option<PathBuf> {
        ProjectDirs::from("", "", "art-keeper").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
