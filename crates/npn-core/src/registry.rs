//! Registry client: metadata lookups and tarball URL templates.
//!
//! The registry hosts published archives and metadata, addressed by package
//! name and version. Only two endpoints are consumed: the per-name metadata
//! document (for its optional `repository` field) and the per-name-and-version
//! tarball.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::fetch::{self, FetchError};
use crate::types::PackageName;

/// The default registry base URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// A registry endpoint plus the HTTP client used to reach it.
#[derive(Debug, Clone)]
pub struct Registry {
    base_url: String,
    client: Client,
}

/// Shape of the registry metadata document; only the fields we consume.
#[derive(Debug, Deserialize)]
struct Metadata {
    repository: Option<RepositoryField>,
}

/// The `repository.{type,url}` field of a metadata document.
#[derive(Debug, Deserialize)]
struct RepositoryField {
    #[serde(rename = "type")]
    _kind: Option<String>,
    url: Option<String>,
}

impl Registry {
    /// Create a registry client for the given base URL.
    ///
    /// The user agent is attached per request by the transfer layer, so a
    /// plain client suffices here.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a registry client reusing an existing HTTP client.
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The shared HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Metadata endpoint for a package name.
    pub fn metadata_url(&self, name: &PackageName) -> String {
        format!("{}/{name}", self.base_url)
    }

    /// Tarball endpoint for a package name and version.
    pub fn tarball_url(&self, name: &PackageName, version: &str) -> String {
        format!("{}/{name}/-/{name}-{version}.tgz", self.base_url)
    }

    /// Look up the version-control repository a package declares in its
    /// registry metadata, normalizing a `git+` scheme prefix away.
    ///
    /// A missing package, a non-success status, or an unreadable document all
    /// yield `Ok(None)`: absent metadata must not sink an install that can
    /// still proceed by name and version.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only for transport-level failures.
    pub async fn repository_of(&self, name: &PackageName) -> Result<Option<String>, FetchError> {
        let url = self.metadata_url(name);
        let response = fetch::fetch_stream(&self.client, &url).await?;

        if !response.status().is_success() {
            debug!(%name, status = %response.status(), "no registry metadata");
            return Ok(None);
        }

        let metadata: Metadata = match response.json().await {
            Ok(doc) => doc,
            Err(err) => {
                debug!(%name, %err, "unreadable registry metadata");
                return Ok(None);
            }
        };

        let repo = metadata
            .repository
            .and_then(|r| r.url)
            .map(|u| normalize_repository_url(&u));

        Ok(repo)
    }
}

/// Drop the `git+` shorthand some registries prefix onto clone URLs.
fn normalize_repository_url(url: &str) -> String {
    url.strip_prefix("git+").unwrap_or(url).to_string()
}
