//! BDD tests for planning and executing mirror runs.

use art_keeper::release::{Asset, Release, RepoId};
use art_keeper::store::{FetchError, FileFetcher, ListError, ReleaseLister};
use art_keeper::sync::SyncReport;
use art_keeper_mirror::app::RunPlan;
use art_keeper_mirror::cli::Cli;
use art_keeper_mirror::config::CONFIG_FILE_NAME;
use art_keeper_mirror::dirs::BaseDirs;
use art_keeper_mirror::scratch::LOCK_FILE_NAME;
use camino::Utf8PathBuf;
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::Cell;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
const BASE_URL: &str = "https://downloads.invalid";

const CLI_ENV_VARS: &[&str] = &[
    "DATA_DIR",
    "ART_KEEPER_CONFIG",
    "DRY_RUN",
    "S3_ENDPOINT",
    "S3_ACCESS_KEY_ID",
    "S3_SECRET_ACCESS_KEY",
];

/// Platform directories that are never consulted.
struct NoPlatformDirs;

impl BaseDirs for NoPlatformDirs {
    fn data_dir(&self) -> Option<PathBuf> {
        None
    }
}

#[derive(Default)]
struct CountingLister {
    releases: Vec<Release>,
    calls: Cell<usize>,
}

impl ReleaseLister for CountingLister {
    fn list_releases(&self, _repo: &RepoId) -> Result<Vec<Release>, ListError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.releases.clone())
    }
}

/// Serves a manifest covering every published asset.
#[derive(Default)]
struct ManifestFetcher {
    manifest: String,
}

impl FileFetcher for ManifestFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        if url == format!("{BASE_URL}/CHECKSUMS") {
            fs::write(dest, &self.manifest)?;
            Ok(())
        } else {
            Err(FetchError::NotFound {
                url: url.to_owned(),
            })
        }
    }
}

#[derive(Default)]
struct RunWorld {
    data_dir: Option<TempDir>,
    repos: Vec<String>,
    filters: Vec<(String, String)>,
    lister: CountingLister,
    fetcher: ManifestFetcher,
    scratch_dir: Option<Utf8PathBuf>,
    report: Option<SyncReport>,
    error: Option<String>,
}

impl RunWorld {
    fn data_path(&self) -> Utf8PathBuf {
        let dir = self.data_dir.as_ref().expect("data dir");
        Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 path")
    }

    fn write_config(&self) {
        let mut config = String::from("repos:\n");
        for repo in &self.repos {
            writeln!(config, "  - {repo}").expect("format");
        }
        if !self.filters.is_empty() {
            config.push_str("filters:\n");
            for (kind, value) in &self.filters {
                writeln!(config, "  - type: {kind}\n    value: \"{value}\"").expect("format");
            }
        }
        fs::write(self.data_path().join(CONFIG_FILE_NAME), config).expect("write config");
    }

    fn start(&mut self, extra: &[&str]) {
        self.write_config();
        let data_dir = self.data_path();
        let mut args = vec!["art-keeper", "--data-dir", data_dir.as_str()];
        args.extend_from_slice(extra);
        let cli = temp_env::with_vars_unset(CLI_ENV_VARS, || Cli::try_parse_from(args.iter().copied()))
            .expect("arguments parse");

        let outcome = RunPlan::resolve(&cli, &NoPlatformDirs).and_then(|plan| {
            self.scratch_dir = Some(plan.scratch_dir.clone());
            plan.execute(&self.lister, &self.fetcher, &Unreachable)
        });
        match outcome {
            Ok(report) => self.report = Some(report),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn report(&self) -> &SyncReport {
        self.report.as_ref().expect("run completed")
    }
}

/// Store that fails the test if the engine touches it.
struct Unreachable;

impl art_keeper::store::ObjectStore for Unreachable {
    fn bucket_exists(&self) -> Result<bool, art_keeper::store::StoreError> {
        panic!("bucket_exists called");
    }

    fn create_bucket(&self) -> Result<(), art_keeper::store::StoreError> {
        panic!("create_bucket called");
    }

    fn stat_object(
        &self,
        _name: &str,
        _algorithm: art_keeper::checksums::ChecksumAlgorithm,
    ) -> Result<Option<art_keeper::store::StoredObject>, art_keeper::store::StoreError> {
        panic!("stat_object called");
    }

    fn put_object(
        &self,
        _local: &Path,
        _name: &str,
        _checksum: &art_keeper::checksums::Digest,
    ) -> Result<(), art_keeper::store::StoreError> {
        panic!("put_object called");
    }
}

#[fixture]
fn world() -> RunWorld {
    RunWorld {
        data_dir: Some(tempfile::tempdir().expect("temp dir")),
        ..Default::default()
    }
}

#[given("a configuration mirroring \"{repo}\"")]
fn given_configuration(world: &mut RunWorld, repo: String) {
    world.repos.push(repo);
}

#[given("the configured filter \"{kind}\" is \"{value}\"")]
fn given_filter(world: &mut RunWorld, kind: String, value: String) {
    world.filters.push((kind, value));
}

#[given("release \"{tag}\" publishes \"{first}\" and \"{second}\"")]
fn given_release(world: &mut RunWorld, tag: String, first: String, second: String) {
    let mut assets = vec![Asset::new("CHECKSUMS", format!("{BASE_URL}/CHECKSUMS"), 0)];
    let mut manifest = String::new();
    for name in [first, second] {
        writeln!(manifest, "{SHA256_EMPTY}  {name}").expect("format");
        assets.push(Asset::new(name.clone(), format!("{BASE_URL}/{name}"), 0));
    }
    world.fetcher.manifest = manifest;
    world.lister.releases.push(Release::new(tag, assets));
}

#[when("the run is started with \"{flag}\"")]
fn when_started_with(world: &mut RunWorld, flag: String) {
    world.start(&[flag.as_str()]);
}

#[when("the run is started without options")]
fn when_started(world: &mut RunWorld) {
    world.start(&[]);
}

#[then("{count} asset is planned")]
fn then_planned(world: &mut RunWorld, count: usize) {
    assert_eq!(world.report().planned(), count);
}

#[then("{count} asset is filtered")]
fn then_filtered(world: &mut RunWorld, count: usize) {
    assert_eq!(world.report().filtered(), count);
}

#[then("the scratch directory holds the run lock")]
fn then_lock_file(world: &mut RunWorld) {
    let scratch = world.scratch_dir.as_ref().expect("scratch dir");
    assert!(scratch.join(LOCK_FILE_NAME).exists());
}

#[then("the run is refused mentioning \"{snippet}\"")]
fn then_refused(world: &mut RunWorld, snippet: String) {
    let error = world.error.as_deref().expect("run should be refused");
    assert!(error.contains(&snippet), "error was {error}");
    assert!(world.report.is_none());
}

#[then("no release listing was requested")]
fn then_no_listing(world: &mut RunWorld) {
    assert_eq!(world.lister.calls.get(), 0);
}

#[scenario(
    path = "tests/features/run.feature",
    name = "A dry run plans assets without an object store"
)]
fn scenario_dry_run(world: RunWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/run.feature",
    name = "A real run needs an object store endpoint"
)]
fn scenario_missing_endpoint(world: RunWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/run.feature",
    name = "An unknown filter value stops the run before any request"
)]
fn scenario_unknown_filter(world: RunWorld) {
    let _ = world;
}
