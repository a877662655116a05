//! Command-line interface for the `art-keeper` binary.
//!
//! Every setting can also come from the environment (and therefore from a
//! `.env` file, which the binary loads before parsing). Flags take precedence
//! over environment variables.

use camino::Utf8PathBuf;
use clap::Parser;
use std::time::Duration;

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Default destination bucket.
pub const DEFAULT_BUCKET: &str = "artifacts";

/// Default object store region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Mirror GitHub release artefacts into an S3-compatible bucket.
#[derive(Parser, Debug, Clone)]
#[command(name = "art-keeper")]
#[command(version, about)]
#[command(long_about = concat!(
    "Mirror GitHub release artefacts into an S3-compatible bucket.\n\n",
    "For every configured repository, each release's checksum manifest ",
    "(CHECKSUMS or checksums) is fetched, the remaining assets are filtered by ",
    "architecture, platform, extension or regex, and every asset that is absent ",
    "from the bucket, or stored with a different checksum, is downloaded, ",
    "verified and uploaded under a tag-qualified name.\n\n",
    "Runs are idempotent: re-running over a fully mirrored repository transfers ",
    "nothing, and an interrupted run resumes where it stopped.",
))]
#[command(after_help = concat!(
    "CONFIGURATION FILE (default: <data-dir>/config.yaml):\n",
    "  repos:\n",
    "    - acme/tool\n",
    "  filters:\n",
    "    - type: platform      # arch | platform | extension | regex\n",
    "      value: linux\n",
    "  checksum_algorithm: sha256   # or sha1\n",
    "  verify_downloads: true\n\n",
    "EXAMPLES:\n",
    "  Mirror into a local MinIO:\n",
    "    $ art-keeper --s3-endpoint http://localhost:9000 \\\n",
    "        --s3-access-key-id minio --s3-secret-access-key minio123\n\n",
    "  Preview what would be mirrored:\n",
    "    $ art-keeper --dry-run\n",
))]
pub struct Cli {
    /// Base directory holding the configuration and scratch space
    /// [default: platform data directory].
    #[arg(long, env = "DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Configuration file [default: <data-dir>/config.yaml].
    #[arg(short, long, env = "ART_KEEPER_CONFIG", value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Log what would be mirrored without touching the bucket.
    ///
    /// `DRY_RUN` accepts true/false, yes/no, on/off and 1/0.
    #[arg(
        long,
        env = "DRY_RUN",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// GitHub token for authenticated API requests.
    #[arg(long, env = "GITHUB_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub REST API base URL.
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL", default_value = DEFAULT_GITHUB_API)]
    pub github_api: String,

    /// S3-compatible endpoint URL.
    #[arg(long, env = "S3_ENDPOINT", value_name = "URL")]
    pub s3_endpoint: Option<String>,

    /// S3 access key identifier.
    #[arg(long, env = "S3_ACCESS_KEY_ID", value_name = "KEY")]
    pub s3_access_key_id: Option<String>,

    /// S3 secret access key.
    #[arg(
        long,
        env = "S3_SECRET_ACCESS_KEY",
        value_name = "SECRET",
        hide_env_values = true
    )]
    pub s3_secret_access_key: Option<String>,

    /// S3 region.
    #[arg(long, env = "S3_REGION", value_name = "REGION", default_value = DEFAULT_REGION)]
    pub s3_region: String,

    /// Destination bucket.
    #[arg(long, env = "S3_BUCKET", value_name = "BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Timeout in seconds for connecting and awaiting each response.
    ///
    /// Asset bodies stream without a time limit.
    #[arg(
        long,
        env = "ART_KEEPER_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Exit with status 2 when any release or asset failed.
    #[arg(long)]
    pub strict: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Return the per-phase network timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
