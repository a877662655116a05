//! GitHub REST API release listing.
//!
//! Only the first page of results is requested; repositories with more
//! releases than a page holds are mirrored from their most recent page.

use crate::http::{USER_AGENT, build_agent};
use art_keeper::release::{Asset, Release, RepoId};
use art_keeper::store::{ListError, ReleaseLister};
use serde::Deserialize;
use std::io::{BufReader, Read};
use std::time::Duration;

/// Media type GitHub recommends for REST API requests.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Releases requested per listing call.
const PER_PAGE: &str = "100";

/// Release lister backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client for the API rooted at `api_base`.
    ///
    /// `token`, when given, is sent as a bearer token.
    #[must_use]
    pub fn new(api_base: &str, token: Option<String>, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            api_base: api_base.trim_end_matches('/').to_owned(),
            token,
        }
    }

    /// URL listing the releases of `repo`.
    #[must_use]
    pub fn releases_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base,
            repo.owner(),
            repo.name()
        )
    }
}

impl ReleaseLister for GithubClient {
    fn list_releases(&self, repo: &RepoId) -> Result<Vec<Release>, ListError> {
        let url = self.releases_url(repo);
        log::debug!("listing releases of {repo} from {url}");
        let mut request = self
            .agent
            .get(&url)
            .query("per_page", PER_PAGE)
            .header("Accept", GITHUB_MEDIA_TYPE)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.call().map_err(|e| map_list_error(repo, &e))?;
        let releases = decode_releases(repo, response.into_body().into_reader())?;
        log::debug!("{repo} has {} release(s)", releases.len());
        Ok(releases)
    }
}

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    tag_name: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    assets: Vec<AssetPayload>,
}

#[derive(Debug, Deserialize)]
struct AssetPayload {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: u64,
}

impl From<ReleasePayload> for Release {
    fn from(payload: ReleasePayload) -> Self {
        let assets = payload
            .assets
            .into_iter()
            .map(|asset| Asset::new(asset.name, asset.browser_download_url, asset.size))
            .collect();
        Self {
            tag_name: payload.tag_name,
            published_at: payload.published_at,
            assets,
        }
    }
}

/// Decode a release listing response body as it streams in.
///
/// Listings are not size-capped; a page of releases with long notes can run
/// to tens of megabytes.
fn decode_releases(repo: &RepoId, body: impl Read) -> Result<Vec<Release>, ListError> {
    let payloads: Vec<ReleasePayload> =
        serde_json::from_reader(BufReader::new(body)).map_err(|e| {
            let name = repo.to_string();
            let reason = e.to_string();
            if e.is_io() {
                ListError::Http { repo: name, reason }
            } else {
                ListError::Decode { repo: name, reason }
            }
        })?;
    Ok(payloads.into_iter().map(Release::from).collect())
}

/// Map a ureq error to a [`ListError`].
fn map_list_error(repo: &RepoId, err: &ureq::Error) -> ListError {
    match err {
        ureq::Error::StatusCode(404) => ListError::NotFound {
            repo: repo.to_string(),
        },
        other => ListError::Http {
            repo: repo.to_string(),
            reason: other.to_string(),
        },
    }
}
