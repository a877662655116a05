//! Scratch directory preparation and the per-run lock.

use crate::error::{MirrorError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};

/// Scratch directory name inside the data directory.
pub const SCRATCH_DIR_NAME: &str = "artifacts";

/// Lock file name inside the scratch directory.
pub const LOCK_FILE_NAME: &str = ".art-keeper.lock";

const WRITE_CHECK_FILE_NAME: &str = ".art-keeper-write-check";

/// Create `dir` if needed and confirm it accepts new files.
///
/// # Errors
///
/// Returns [`MirrorError::ScratchNotWritable`] if the directory cannot be
/// created or a file cannot be written inside it.
pub fn prepare_scratch_dir(dir: &Utf8Path) -> Result<()> {
    let not_writable = |e: std::io::Error| MirrorError::ScratchNotWritable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };
    fs::create_dir_all(dir).map_err(not_writable)?;

    let check = dir.join(WRITE_CHECK_FILE_NAME);
    fs::write(&check, b"ok").map_err(not_writable)?;
    if let Err(e) = fs::remove_file(&check) {
        log::debug!("could not remove write check file {check}: {e}");
    }
    Ok(())
}

/// Exclusive advisory lock held for the duration of a run.
///
/// Released when dropped.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: Utf8PathBuf,
}

impl RunLock {
    /// Take the lock for the scratch directory `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Locked`] if another process holds the lock, or
    /// an I/O error if the lock file cannot be opened.
    pub fn acquire(dir: &Utf8Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                log::debug!("acquired run lock {path}");
                Ok(Self { file, path })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(MirrorError::Locked { path })
            }
            Err(e) => Err(MirrorError::Io(e)),
        }
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release run lock {}: {e}", self.path);
        }
    }
}
