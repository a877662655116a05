//! HTTP download of release assets and manifests.

use crate::http::{USER_AGENT, build_agent};
use art_keeper::store::{FetchError, FileFetcher};
use std::io;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// File fetcher using `ureq`.
///
/// The body is streamed into a temporary file beside the destination and
/// renamed into place once complete, so a failed download never leaves a
/// partial file at `dest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose connection phases are bounded by `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
        }
    }
}

impl FileFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        log::debug!("downloading {url} to {}", dest.display());
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/octet-stream")
            .call()
            .map_err(|e| map_fetch_error(url, &e))?;

        let dir = dest
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staging = NamedTempFile::new_in(dir)?;
        io::copy(&mut response.into_body().as_reader(), staging.as_file_mut()).map_err(|e| {
            FetchError::Http {
                url: url.to_owned(),
                reason: e.to_string(),
            }
        })?;
        staging.as_file().sync_all()?;
        staging.persist(dest).map_err(|e| FetchError::Io(e.error))?;
        Ok(())
    }
}

/// Map a ureq error to a [`FetchError`].
fn map_fetch_error(url: &str, err: &ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(404) => FetchError::NotFound {
            url: url.to_owned(),
        },
        other => FetchError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
