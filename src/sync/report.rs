//! Per-run record of synchronisation outcomes.

use std::fmt;

/// What happened to one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// The filter sequence excluded the asset.
    Filtered,
    /// The destination already holds the object with a matching checksum.
    Present,
    /// The asset was downloaded and uploaded.
    Transferred,
    /// Dry run: the asset passed the filters and would be considered.
    Planned,
    /// Verification or transfer failed; the asset was abandoned.
    Failed {
        /// Rendered error.
        reason: String,
    },
}

/// Outcome of one asset together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Release tag.
    pub tag: String,
    /// Original asset name.
    pub asset: String,
    /// Normalised object name, absent for filtered assets.
    pub object: Option<String>,
    /// What happened.
    pub outcome: AssetOutcome,
}

/// A release, or a whole repository, that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Release tag; `None` when the release list itself was unavailable.
    pub tag: Option<String>,
    /// Rendered error.
    pub reason: String,
}

/// Everything a run did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    assets: Vec<AssetRecord>,
    release_failures: Vec<ReleaseFailure>,
}

impl SyncReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset outcome.
    pub fn record_asset(&mut self, record: AssetRecord) {
        self.assets.push(record);
    }

    /// Append a release-level failure.
    pub fn record_release_failure(&mut self, failure: ReleaseFailure) {
        self.release_failures.push(failure);
    }

    /// Return every asset record.
    #[must_use]
    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    /// Return every release-level failure.
    #[must_use]
    pub fn release_failures(&self) -> &[ReleaseFailure] {
        &self.release_failures
    }

    /// Object names that were uploaded, in order.
    pub fn transferred_objects(&self) -> impl Iterator<Item = &str> {
        self.assets
            .iter()
            .filter(|record| record.outcome == AssetOutcome::Transferred)
            .filter_map(|record| record.object.as_deref())
    }

    /// Number of uploaded assets.
    #[must_use]
    pub fn transferred(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Transferred))
    }

    /// Number of assets already present at the destination.
    #[must_use]
    pub fn present(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Present))
    }

    /// Number of assets a dry run would consider.
    #[must_use]
    pub fn planned(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Planned))
    }

    /// Number of assets excluded by the filters.
    #[must_use]
    pub fn filtered(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Filtered))
    }

    /// Number of abandoned assets.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Failed { .. }))
    }

    /// Return whether any asset or release failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || !self.release_failures.is_empty()
    }

    fn count(&self, predicate: impl Fn(&AssetOutcome) -> bool) -> usize {
        self.assets
            .iter()
            .filter(|record| predicate(&record.outcome))
            .count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transferred={} present={} planned={} filtered={} failed={} release_failures={}",
            self.transferred(),
            self.present(),
            self.planned(),
            self.filtered(),
            self.failed(),
            self.release_failures.len()
        )
    }
}
