//! Storage key derivation for mirrored assets.
//!
//! Some release pipelines publish assets without the version in the file
//! name, so two releases would collide in the destination. The stored name
//! therefore always embeds the release tag, inserted after the repository's
//! short-name prefix.

use crate::release::RepoId;

/// Derive the object name an asset is stored under.
///
/// - A name that already contains `tag` is returned unchanged.
/// - Otherwise `"<tag>-"` is inserted after the first occurrence of
///   `"<short name>-"`.
/// - A name without that prefix is returned unchanged.
///
/// The function is idempotent: once the tag is present, re-normalising is a
/// no-op.
///
/// # Examples
///
/// ```
/// use art_keeper::naming::normalise_asset_name;
/// use art_keeper::release::RepoId;
///
/// let repo: RepoId = "acme/tool".parse().expect("valid repo id");
/// assert_eq!(
///     normalise_asset_name("tool-linux-amd64", "v1.2.0", &repo),
///     "tool-v1.2.0-linux-amd64"
/// );
/// ```
#[must_use]
pub fn normalise_asset_name(asset_name: &str, tag: &str, repo: &RepoId) -> String {
    if asset_name.contains(tag) {
        return asset_name.to_owned();
    }
    let prefix = format!("{}-", repo.name());
    if !asset_name.contains(&prefix) {
        return asset_name.to_owned();
    }
    asset_name.replacen(&prefix, &format!("{prefix}{tag}-"), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repo() -> RepoId {
        "acme/tool".parse().expect("valid repo id")
    }

    #[rstest]
    #[case::inserts_after_prefix("tool-linux-amd64", "tool-v1.2.0-linux-amd64")]
    #[case::already_tagged("tool-v1.2.0-linux-amd64", "tool-v1.2.0-linux-amd64")]
    #[case::tag_elsewhere("linux-amd64-v1.2.0.tar.gz", "linux-amd64-v1.2.0.tar.gz")]
    #[case::prefix_absent("linux-amd64", "linux-amd64")]
    #[case::short_name_without_dash("tool.exe", "tool.exe")]
    #[case::only_first_occurrence("tool-tool-linux", "tool-v1.2.0-tool-linux")]
    #[case::prefix_not_at_start("my-tool-linux", "my-tool-v1.2.0-linux")]
    fn normalises_names(repo: RepoId, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise_asset_name(input, "v1.2.0", &repo), expected);
    }

    #[rstest]
    #[case("tool-linux-amd64")]
    #[case("tool-windows-amd64.exe")]
    #[case("checksums.txt")]
    #[case("tool-v1.2.0-darwin-arm64")]
    fn normalisation_is_idempotent(repo: RepoId, #[case] input: &str) {
        let once = normalise_asset_name(input, "v1.2.0", &repo);
        let twice = normalise_asset_name(&once, "v1.2.0", &repo);
        assert_eq!(once, twice);
    }

    #[rstest]
    fn uses_repository_short_name_not_owner(repo: RepoId) {
        assert_eq!(
            normalise_asset_name("acme-linux-amd64", "v2", &repo),
            "acme-linux-amd64"
        );
    }
}
