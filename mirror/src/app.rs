//! Run orchestration for the `art-keeper` binary.
//!
//! Resolves directories and settings from the CLI, loads the configuration,
//! builds the network clients and drives one synchronisation run under the
//! scratch directory lock.

use crate::cli::Cli;
use crate::config::{CONFIG_FILE_NAME, MirrorConfig, load_config};
use crate::dirs::BaseDirs;
use crate::error::{MirrorError, Result};
use crate::fetch::HttpFetcher;
use crate::github::GithubClient;
use crate::s3::{S3Settings, S3Store};
use crate::scratch::{RunLock, SCRATCH_DIR_NAME, prepare_scratch_dir};
use art_keeper::checksums::{ChecksumAlgorithm, Digest};
use art_keeper::store::{FileFetcher, ObjectStore, ReleaseLister, StoreError, StoredObject};
use art_keeper::sync::{SyncOptions, SyncReport, Synchroniser};
use camino::Utf8PathBuf;
use std::path::Path;

/// Exit status of a run that completed with failed releases or assets under
/// `--strict`.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Everything resolved before any network call is made.
#[derive(Debug)]
pub struct RunPlan {
    /// Configuration file that was loaded.
    pub config_path: Utf8PathBuf,
    /// Directory downloads are staged in.
    pub scratch_dir: Utf8PathBuf,
    /// Validated configuration.
    pub config: MirrorConfig,
    /// Object store settings; absent in dry-run mode.
    pub store: Option<S3Settings>,
    /// Whether the destination is left untouched.
    pub dry_run: bool,
}

impl RunPlan {
    /// Resolve directories, settings and configuration for `cli`.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined, a required
    /// store setting is missing outside dry-run mode, or the configuration
    /// file is unusable.
    pub fn resolve(cli: &Cli, dirs: &dyn BaseDirs) -> Result<Self> {
        let data_dir = resolve_data_dir(cli, dirs)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
        let store = if cli.dry_run {
            None
        } else {
            Some(store_settings(cli)?)
        };
        let config = load_config(&config_path)?;
        Ok(Self {
            config_path,
            scratch_dir: data_dir.join(SCRATCH_DIR_NAME),
            config,
            store,
            dry_run: cli.dry_run,
        })
    }

    /// Engine options for this plan.
    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            scratch_dir: self.scratch_dir.clone().into_std_path_buf(),
            algorithm: self.config.algorithm,
            dry_run: self.dry_run,
            verify_downloads: self.config.verify_downloads,
        }
    }

    /// Run the synchronisation with the given collaborators.
    ///
    /// The scratch directory is prepared and locked for the whole run.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory is unusable or locked, or
    /// if the destination bucket cannot be ensured.
    pub fn execute(
        &self,
        lister: &dyn ReleaseLister,
        fetcher: &dyn FileFetcher,
        store: &dyn ObjectStore,
    ) -> Result<SyncReport> {
        prepare_scratch_dir(&self.scratch_dir)?;
        let lock = RunLock::acquire(&self.scratch_dir)?;
        log::info!(
            "mirroring {} repo(s) with config {}{}",
            self.config.repos.len(),
            self.config_path,
            if self.dry_run { " (dry run)" } else { "" }
        );

        let options = self.sync_options();
        let report = Synchroniser::new(lister, fetcher, store, &self.config.filters, &options)
            .run(&self.config.repos)?;
        drop(lock);

        if report.has_failures() {
            log::warn!(
                "run completed with {} failed asset(s) and {} failed release(s)",
                report.failed(),
                report.release_failures().len()
            );
        }
        Ok(report)
    }
}

/// Resolve settings, build the network clients and run once.
///
/// # Errors
///
/// Returns any error that aborts the run; per-asset failures are recorded in
/// the returned report instead.
pub fn run(cli: &Cli, dirs: &dyn BaseDirs) -> Result<SyncReport> {
    let plan = RunPlan::resolve(cli, dirs)?;
    let lister = GithubClient::new(&cli.github_api, cli.github_token.clone(), cli.timeout());
    let fetcher = HttpFetcher::new(cli.timeout());
    match &plan.store {
        Some(settings) => {
            let store = S3Store::connect(settings).map_err(|e| MirrorError::StoreSetup {
                reason: e.to_string(),
            })?;
            plan.execute(&lister, &fetcher, &store)
        }
        None => plan.execute(&lister, &fetcher, &DetachedStore),
    }
}

/// Exit status for a completed run.
#[must_use]
pub fn exit_code_for_report(report: &SyncReport, strict: bool) -> i32 {
    if strict && report.has_failures() {
        EXIT_PARTIAL_FAILURE
    } else {
        0
    }
}

fn resolve_data_dir(cli: &Cli, dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    let dir = dirs.data_dir().ok_or(MirrorError::DataDirUnavailable)?;
    Utf8PathBuf::from_path_buf(dir).map_err(|path| MirrorError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn store_settings(cli: &Cli) -> Result<S3Settings> {
    Ok(S3Settings {
        endpoint: required(
            cli.s3_endpoint.as_ref(),
            "S3 endpoint",
            "--s3-endpoint",
            "S3_ENDPOINT",
        )?,
        access_key_id: required(
            cli.s3_access_key_id.as_ref(),
            "S3 access key id",
            "--s3-access-key-id",
            "S3_ACCESS_KEY_ID",
        )?,
        secret_access_key: required(
            cli.s3_secret_access_key.as_ref(),
            "S3 secret access key",
            "--s3-secret-access-key",
            "S3_SECRET_ACCESS_KEY",
        )?,
        region: cli.s3_region.clone(),
        bucket: cli.bucket.clone(),
        timeout: cli.timeout(),
    })
}

fn required(
    value: Option<&String>,
    setting: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(MirrorError::MissingSetting { setting, flag, env })
}

/// Store handed to the engine in dry-run mode, where it is never consulted.
#[derive(Debug, Clone, Copy)]
struct DetachedStore;

impl DetachedStore {
    fn unavailable(operation: &'static str) -> StoreError {
        StoreError::Request {
            operation,
            reason: "no object store is attached in dry-run mode".to_owned(),
        }
    }
}

impl ObjectStore for DetachedStore {
    fn bucket_exists(&self) -> std::result::Result<bool, StoreError> {
        Err(Self::unavailable("head_bucket"))
    }

    fn create_bucket(&self) -> std::result::Result<(), StoreError> {
        Err(Self::unavailable("create_bucket"))
    }

    fn stat_object(
        &self,
        _name: &str,
        _algorithm: ChecksumAlgorithm,
    ) -> std::result::Result<Option<StoredObject>, StoreError> {
        Err(Self::unavailable("get_object_attributes"))
    }

    fn put_object(
        &self,
        _local: &Path,
        _name: &str,
        _checksum: &Digest,
    ) -> std::result::Result<(), StoreError> {
        Err(Self::unavailable("put_object"))
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
