//! Artifactory over HTTP.
//!
//! Plain artifact URLs are used for GET/PUT/HEAD/DELETE. Folder listings and
//! file sizes come from the storage API (`{root}/api/storage/...`), version
//! lookups from the search API (`{root}/api/search/versions`).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ByteStream, Remote, RemoteError, parent_url};
use crate::config::{Credentials, RepositoryConfig};
use crate::user_agent;

/// HTTP implementation of [`Remote`].
///
/// This client is designed to be created once and reused, taking advantage
/// of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    root: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct StorageInfo {
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    children: Vec<StorageChild>,
}

#[derive(Debug, Deserialize)]
struct StorageChild {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct VersionSearch {
    #[serde(default)]
    results: Vec<VersionResult>,
}

#[derive(Debug, Deserialize)]
struct VersionResult {
    version: String,
}

impl HttpRemote {
    /// Creates a client for the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if the root is not a valid URL,
    /// or [`RemoteError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &RepositoryConfig) -> Result<Self, RemoteError> {
        url::Url::parse(&config.root).map_err(|_| RemoteError::invalid_url(&config.root))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|error| RemoteError::network(&config.root, error))?;
        Ok(Self {
            client,
            root: config.root.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
        })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.api_key))
            }
            None => request,
        }
    }

    /// Sends a request and maps non-success statuses to [`RemoteError`].
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|error| RemoteError::network(url, error))?;
        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "request failed");
            return Err(RemoteError::from_status(url, status.as_u16()));
        }
        Ok(response)
    }

    /// `{root}/api/storage/{repository}/{path}` for an artifact URL.
    fn storage_api_url(&self, url: &str) -> Result<String, RemoteError> {
        let relative = url
            .strip_prefix(&self.root)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| RemoteError::invalid_url(url))?;
        Ok(format!(
            "{}/api/storage/{}",
            self.root,
            relative.trim_end_matches('/')
        ))
    }

    async fn storage_info(&self, url: &str) -> Result<StorageInfo, RemoteError> {
        let api_url = self.storage_api_url(url)?;
        let response = self
            .send(self.request(Method::GET, &api_url), url)
            .await?;
        response
            .json::<StorageInfo>()
            .await
            .map_err(|error| RemoteError::invalid_response(&api_url, error.to_string()))
    }
}

#[async_trait]
impl Remote for HttpRemote {
    fn root(&self) -> &str {
        &self.root
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str) -> Result<String, RemoteError> {
        let response = self.send(self.request(Method::GET, url), url).await?;
        response
            .text()
            .await
            .map_err(|error| RemoteError::network(url, error))
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_size(&self, url: &str) -> Result<u64, RemoteError> {
        let info = self.storage_info(url).await?;
        info.size
            .as_deref()
            .and_then(|size| size.parse::<u64>().ok())
            .ok_or_else(|| RemoteError::invalid_response(url, "storage info has no file size"))
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn open_stream(&self, url: &str) -> Result<ByteStream, RemoteError> {
        let response = self.send(self.request(Method::GET, url), url).await?;
        let owned_url = url.to_string();
        Ok(response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|error| RemoteError::network(owned_url.clone(), error)))
            .boxed())
    }

    #[instrument(skip(self, body), fields(url = %url, bytes = body.len()))]
    async fn put_bytes(&self, url: &str, body: Bytes) -> Result<(), RemoteError> {
        self.send(self.request(Method::PUT, url).body(body), url)
            .await?;
        debug!("upload complete");
        Ok(())
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn exists(&self, url: &str) -> Result<bool, RemoteError> {
        match self.send(self.request(Method::HEAD, url), url).await {
            Ok(_) => Ok(true),
            Err(RemoteError::NotFound { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn ensure_parent(&self, url: &str) -> Result<(), RemoteError> {
        let parent = parent_url(url);
        if self.exists(parent).await? {
            return Ok(());
        }
        // A PUT on a path with trailing slash creates the folder.
        let folder = format!("{parent}/");
        self.send(self.request(Method::PUT, &folder), &folder).await?;
        debug!(folder = %parent, "created folder");
        Ok(())
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn remove(&self, url: &str) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, url), url).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn remove_tree(&self, url: &str) -> Result<(), RemoteError> {
        // Deleting a folder removes its content as well.
        let folder = format!("{}/", url.trim_end_matches('/'));
        self.send(self.request(Method::DELETE, &folder), &folder)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn list_children(&self, url: &str) -> Result<Vec<String>, RemoteError> {
        let info = self.storage_info(url).await?;
        let base = url.trim_end_matches('/');
        Ok(info
            .children
            .into_iter()
            .map(|child| format!("{base}/{}", child.uri.trim_start_matches('/')))
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_versions(
        &self,
        repository: &str,
        group_id: &str,
        name: &str,
        pattern: &str,
    ) -> Result<Vec<String>, RemoteError> {
        let search_url = format!("{}/api/search/versions", self.root);
        let query_url = url::Url::parse_with_params(
            &search_url,
            &[
                ("g", group_id),
                ("a", name),
                ("v", pattern),
                ("repos", repository),
            ],
        )
        .map_err(|_| RemoteError::invalid_url(&search_url))?;
        let response = self
            .send(self.request(Method::GET, query_url.as_str()), &search_url)
            .await?;
        let search = response
            .json::<VersionSearch>()
            .await
            .map_err(|error| RemoteError::invalid_response(&search_url, error.to_string()))?;
        debug!(count = search.results.len(), "version search complete");
        Ok(search
            .results
            .into_iter()
            .map(|result| result.version)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn remote() -> HttpRemote {
        HttpRemote::new(&RepositoryConfig::new("https://host/artifactory", "maven")).unwrap()
    }

    #[test]
    fn test_storage_api_url() {
        let remote = remote();
        assert_eq!(
            remote
                .storage_api_url("https://host/artifactory/maven/a/b/")
                .unwrap(),
            "https://host/artifactory/api/storage/maven/a/b"
        );
    }

    #[test]
    fn test_storage_api_url_rejects_foreign_url() {
        let remote = remote();
        assert!(matches!(
            remote.storage_api_url("https://other/maven/a"),
            Err(RemoteError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_new_rejects_invalid_root() {
        let config = RepositoryConfig::new("not a url", "maven");
        assert!(matches!(
            HttpRemote::new(&config),
            Err(RemoteError::InvalidUrl { .. })
        ));
    }
}
