//! Remote storage collaborator.
//!
//! Everything that touches the server goes through the [`Remote`] trait so
//! the resolver and the lookup engine can run against any backend:
//!
//! - [`HttpRemote`] - Artifactory over HTTP (reqwest)
//! - [`MemoryRemote`] - in-process store for tests and offline use
//!
//! URLs passed to a remote are full artifact URLs of the form
//! `{root}/{repository}/{path}`.

mod error;
mod http;
mod memory;

pub use error::RemoteError;
pub use http::HttpRemote;
pub use memory::MemoryRemote;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// Stream of body chunks returned by [`Remote::open_stream`].
pub type ByteStream = BoxStream<'static, Result<Bytes, RemoteError>>;

/// Primitive operations on a repository server.
///
/// # Object Safety
///
/// This trait uses `async_trait` so it can be shared as `Arc<dyn Remote>`.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Server root every URL handled by this remote starts with.
    fn root(&self) -> &str;

    /// Downloads `url` as UTF-8 text.
    async fn fetch_text(&self, url: &str) -> Result<String, RemoteError>;

    /// Size of the file at `url` in bytes.
    async fn fetch_size(&self, url: &str) -> Result<u64, RemoteError>;

    /// Opens `url` for streaming download.
    async fn open_stream(&self, url: &str) -> Result<ByteStream, RemoteError>;

    /// Uploads `body` to `url`, replacing any existing file.
    async fn put_bytes(&self, url: &str, body: Bytes) -> Result<(), RemoteError>;

    /// Returns true if a file or folder exists at `url`.
    async fn exists(&self, url: &str) -> Result<bool, RemoteError>;

    /// Creates the parent folder of `url` if it is missing.
    async fn ensure_parent(&self, url: &str) -> Result<(), RemoteError>;

    /// Deletes the file at `url`.
    async fn remove(&self, url: &str) -> Result<(), RemoteError>;

    /// Deletes the folder at `url` with everything below it.
    async fn remove_tree(&self, url: &str) -> Result<(), RemoteError>;

    /// URLs of the direct children of folder `url`.
    async fn list_children(&self, url: &str) -> Result<Vec<String>, RemoteError>;

    /// Versions of `group_id:name` in `repository` matching `pattern`.
    ///
    /// The order of the result is unspecified. Fails with
    /// [`RemoteError::NotFound`] when the server reports no match.
    async fn list_versions(
        &self,
        repository: &str,
        group_id: &str,
        name: &str,
        pattern: &str,
    ) -> Result<Vec<String>, RemoteError>;
}

/// Parent of a URL or path: everything before the last `/`.
pub(crate) fn parent_url(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    trimmed.rsplit_once('/').map_or(trimmed, |(parent, _)| parent)
}
