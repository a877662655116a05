//! Release synchronisation engine.
//!
//! [`Synchroniser`] walks every release of every configured repository and
//! copies the assets that pass the filter sequence into the destination
//! store, unless an object with a matching checksum is already there. Each
//! release is processed as a small state machine:
//!
//! 1. locate the checksum manifest asset;
//! 2. fetch and parse it;
//! 3. drop it from the working set;
//! 4. for each remaining asset: filter, normalise the object name, look up
//!    the manifest digest by the original name, stat the destination, and
//!    transfer when the object is absent or differs.
//!
//! Release failures skip to the next release and asset failures skip to the
//! next asset. Only a destination bucket that cannot be ensured aborts the
//! run, and it is checked once before any transfer.

pub mod error;
pub mod report;

pub use error::{SyncError, TransferError, VerificationError};
pub use report::{AssetOutcome, AssetRecord, ReleaseFailure, SyncReport};

use crate::checksums::{
    ChecksumAlgorithm, ChecksumManifest, Digest, MANIFEST_ASSET_NAMES, ManifestError,
    compute_file_digest,
};
use crate::filter::{Filter, FilterSequence};
use crate::naming::normalise_asset_name;
use crate::release::{Asset, Release, RepoId};
use crate::store::{FileFetcher, ObjectStore, ReleaseLister};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Settings that shape a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Directory downloads are staged in before upload.
    pub scratch_dir: PathBuf,
    /// Algorithm manifest digests and stored checksums are compared with.
    pub algorithm: ChecksumAlgorithm,
    /// Record what would be mirrored without touching the destination.
    pub dry_run: bool,
    /// Hash each download and compare it with the manifest before upload.
    pub verify_downloads: bool,
}

impl SyncOptions {
    /// Options for a real run staging files in `scratch_dir`, with SHA-256
    /// comparison and download verification enabled.
    #[must_use]
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            algorithm: ChecksumAlgorithm::default(),
            dry_run: false,
            verify_downloads: true,
        }
    }
}

/// Drives one synchronisation run over borrowed collaborators.
///
/// # Examples
///
/// ```no_run
/// use art_keeper::filter::FilterSequence;
/// use art_keeper::release::RepoId;
/// use art_keeper::store::{FileFetcher, ObjectStore, ReleaseLister};
/// use art_keeper::sync::{SyncOptions, Synchroniser};
///
/// fn mirror(
///     lister: &dyn ReleaseLister,
///     fetcher: &dyn FileFetcher,
///     store: &dyn ObjectStore,
/// ) {
///     let filters = FilterSequence::new();
///     let options = SyncOptions::new("/var/lib/art-keeper/artifacts");
///     let repos: Vec<RepoId> = vec!["acme/tool".parse().expect("valid repo id")];
///     let report = Synchroniser::new(lister, fetcher, store, &filters, &options)
///         .run(&repos)
///         .expect("bucket available");
///     println!("{report}");
/// }
/// ```
pub struct Synchroniser<'a> {
    lister: &'a dyn ReleaseLister,
    fetcher: &'a dyn FileFetcher,
    store: &'a dyn ObjectStore,
    filters: &'a FilterSequence,
    options: &'a SyncOptions,
}

impl<'a> Synchroniser<'a> {
    /// Assemble an engine from its collaborators.
    #[must_use]
    pub const fn new(
        lister: &'a dyn ReleaseLister,
        fetcher: &'a dyn FileFetcher,
        store: &'a dyn ObjectStore,
        filters: &'a FilterSequence,
        options: &'a SyncOptions,
    ) -> Self {
        Self {
            lister,
            fetcher,
            store,
            filters,
            options,
        }
    }

    /// Synchronise every repository in `repos`, in order.
    ///
    /// Outside dry-run mode the destination bucket is ensured first, once.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Bucket`] if the bucket cannot be checked or
    /// created. Every other failure is recorded in the returned report.
    pub fn run(&self, repos: &[RepoId]) -> Result<SyncReport, SyncError> {
        if !self.options.dry_run {
            self.ensure_bucket()?;
        }
        let mut report = SyncReport::new();
        for repo in repos {
            if let Err(err) = self.sync_repo(repo, &mut report) {
                warn!("repo={repo} skipping repository: {err}");
                report.record_release_failure(ReleaseFailure {
                    repo: repo.to_string(),
                    tag: None,
                    reason: err.to_string(),
                });
            }
        }
        info!("sync finished: {report}");
        Ok(report)
    }

    /// Synchronise every release of `repo`, appending outcomes to `report`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ListReleases`] if the releases cannot be listed.
    pub fn sync_repo(&self, repo: &RepoId, report: &mut SyncReport) -> Result<(), SyncError> {
        let releases =
            self.lister
                .list_releases(repo)
                .map_err(|source| SyncError::ListReleases {
                    repo: repo.to_string(),
                    source,
                })?;
        info!("repo={repo} found {} release(s)", releases.len());
        for release in &releases {
            self.sync_release(repo, release, report);
        }
        Ok(())
    }

    /// Synchronise one release, appending outcomes to `report`.
    ///
    /// A missing or unusable manifest is recorded as a release failure and
    /// no asset of the release is considered.
    pub fn sync_release(&self, repo: &RepoId, release: &Release, report: &mut SyncReport) {
        let tag = release.tag_name.as_str();
        let (manifest_asset, manifest) = match self.load_manifest(release) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!("repo={repo} tag={tag} skipping release: {err}");
                report.record_release_failure(ReleaseFailure {
                    repo: repo.to_string(),
                    tag: Some(tag.to_owned()),
                    reason: err.to_string(),
                });
                return;
            }
        };
        debug!(
            "repo={repo} tag={tag} published={} manifest {} lists {} digest(s)",
            release.published_at.as_deref().unwrap_or("unknown"),
            manifest_asset.name,
            manifest.len()
        );

        for asset in release
            .assets
            .iter()
            .filter(|asset| asset.name != manifest_asset.name)
        {
            report.record_asset(self.sync_asset(repo, tag, asset, &manifest));
        }
    }

    fn ensure_bucket(&self) -> Result<(), SyncError> {
        if self.store.bucket_exists().map_err(SyncError::Bucket)? {
            debug!("destination bucket exists");
            return Ok(());
        }
        info!("creating destination bucket");
        self.store.create_bucket().map_err(SyncError::Bucket)
    }

    fn load_manifest<'r>(
        &self,
        release: &'r Release,
    ) -> Result<(&'r Asset, ChecksumManifest), ManifestError> {
        let asset = locate_manifest(release)?;
        let staging = tempfile::Builder::new()
            .prefix(".manifest-")
            .tempdir_in(&self.options.scratch_dir)?;
        let path = staging.path().join(&asset.name);
        self.fetcher
            .fetch(&asset.download_url, &path)
            .map_err(|e| ManifestError::Fetch {
                reason: e.to_string(),
            })?;
        let manifest = ChecksumManifest::from_path(&path)?;
        Ok((asset, manifest))
    }

    fn sync_asset(
        &self,
        repo: &RepoId,
        tag: &str,
        asset: &Asset,
        manifest: &ChecksumManifest,
    ) -> AssetRecord {
        if !self.filters.passes(&asset.name) {
            debug!("repo={repo} tag={tag} asset={} filtered out", asset.name);
            return AssetRecord {
                repo: repo.to_string(),
                tag: tag.to_owned(),
                asset: asset.name.clone(),
                object: None,
                outcome: AssetOutcome::Filtered,
            };
        }

        let context = AssetContext {
            repo,
            tag,
            asset,
            object: normalise_asset_name(&asset.name, tag, repo),
        };
        let outcome = self.mirror_asset(&context, manifest).unwrap_or_else(|err| {
            warn!("{context} abandoned: {err}");
            AssetOutcome::Failed {
                reason: err.to_string(),
            }
        });
        AssetRecord {
            repo: repo.to_string(),
            tag: tag.to_owned(),
            asset: asset.name.clone(),
            object: Some(context.object),
            outcome,
        }
    }

    fn mirror_asset(
        &self,
        context: &AssetContext<'_>,
        manifest: &ChecksumManifest,
    ) -> Result<AssetOutcome, AssetError> {
        let expected = self.expected_digest(manifest, &context.asset.name)?;
        if self.options.dry_run {
            info!("{context} would be mirrored (dry run)");
            return Ok(AssetOutcome::Planned);
        }

        let stored = self
            .store
            .stat_object(&context.object, self.options.algorithm)
            .map_err(VerificationError::Lookup)?;
        match stored {
            Some(object) if object.matches(&expected) => {
                info!("{context} already present, skipping");
                return Ok(AssetOutcome::Present);
            }
            Some(_) => info!("{context} stored checksum differs, transferring"),
            None => info!("{context} absent from destination, transferring"),
        }

        self.transfer(context, &expected)?;
        info!("{context} transferred");
        Ok(AssetOutcome::Transferred)
    }

    fn expected_digest(
        &self,
        manifest: &ChecksumManifest,
        name: &str,
    ) -> Result<Digest, VerificationError> {
        manifest
            .digest_for(name, self.options.algorithm)
            .ok_or_else(|| VerificationError::MissingDigest {
                asset: name.to_owned(),
            })?
            .map_err(|source| VerificationError::InvalidDigest {
                asset: name.to_owned(),
                source,
            })
    }

    fn transfer(&self, context: &AssetContext<'_>, expected: &Digest) -> Result<(), TransferError> {
        let scratch = self.options.scratch_dir.join(&context.object);
        self.fetcher.fetch(&context.asset.download_url, &scratch)?;
        let result = self.verify_and_upload(&scratch, &context.object, expected);
        remove_scratch_file(&scratch);
        result
    }

    fn verify_and_upload(
        &self,
        path: &Path,
        object: &str,
        expected: &Digest,
    ) -> Result<(), TransferError> {
        if self.options.verify_downloads {
            let actual = compute_file_digest(path, expected.algorithm())?;
            if &actual != expected {
                return Err(TransferError::ChecksumMismatch {
                    expected: expected.to_hex(),
                    actual: actual.to_hex(),
                });
            }
        }
        self.store.put_object(path, object, expected)?;
        Ok(())
    }
}

/// Log prefix identifying one asset.
struct AssetContext<'r> {
    repo: &'r RepoId,
    tag: &'r str,
    asset: &'r Asset,
    object: String,
}

impl fmt::Display for AssetContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "repo={} tag={} asset={} object={}",
            self.repo, self.tag, self.asset.name, self.object
        )
    }
}

/// Any asset-level failure.
#[derive(Debug, thiserror::Error)]
enum AssetError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Return the first asset whose name marks it as the checksum manifest.
fn locate_manifest(release: &Release) -> Result<&Asset, ManifestError> {
    release
        .assets
        .iter()
        .find(|asset| MANIFEST_ASSET_NAMES.contains(&asset.name.as_str()))
        .ok_or_else(|| ManifestError::Missing {
            tag: release.tag_name.clone(),
            expected: MANIFEST_ASSET_NAMES.join(", "),
        })
}

fn remove_scratch_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove scratch file {}: {e}", path.display()),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
