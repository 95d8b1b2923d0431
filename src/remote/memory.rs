//! In-process [`Remote`] keeping files in memory.
//!
//! Folders exist implicitly for every stored file and explicitly after
//! [`Remote::ensure_parent`]. Version searches list the version folders of
//! an artifact, the way a repository search reports them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;

use super::{ByteStream, Remote, RemoteError, parent_url};
use crate::coordinates::artifact_base_url;
use crate::version::matches_pattern;

/// Chunk size used when streaming stored files.
const STREAM_CHUNK_BYTES: usize = 4 * 1024;

#[derive(Debug, Default)]
struct Store {
    files: BTreeMap<String, Bytes>,
    folders: BTreeSet<String>,
}

impl Store {
    fn folder_exists(&self, url: &str) -> bool {
        let prefix = format!("{}/", url.trim_end_matches('/'));
        self.folders.contains(url.trim_end_matches('/'))
            || self.files.keys().any(|key| key.starts_with(&prefix))
            || self.folders.iter().any(|folder| folder.starts_with(&prefix))
    }
}

/// Memory-backed repository server.
#[derive(Debug)]
pub struct MemoryRemote {
    root: String,
    store: Mutex<Store>,
}

impl MemoryRemote {
    /// Creates an empty store serving URLs below `root`.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into().trim_end_matches('/').to_string(),
            store: Mutex::new(Store::default()),
        }
    }

    /// Stores `body` at `url` without going through the async API.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Bytes>) {
        self.lock().files.insert(url.into(), body.into());
    }

    /// Returns the stored content of `url`, if any.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.lock().files.get(url).cloned()
    }

    /// URLs of all stored files, sorted.
    #[must_use]
    pub fn file_urls(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_url(&self, url: &str) -> Result<(), RemoteError> {
        if url.starts_with(&self.root) {
            Ok(())
        } else {
            Err(RemoteError::invalid_url(url))
        }
    }

    fn read(&self, url: &str) -> Result<Bytes, RemoteError> {
        self.check_url(url)?;
        self.get(url).ok_or_else(|| RemoteError::not_found(url))
    }
}

#[async_trait]
impl Remote for MemoryRemote {
    fn root(&self) -> &str {
        &self.root
    }

    async fn fetch_text(&self, url: &str) -> Result<String, RemoteError> {
        let body = self.read(url)?;
        String::from_utf8(body.to_vec())
            .map_err(|error| RemoteError::invalid_response(url, error.to_string()))
    }

    async fn fetch_size(&self, url: &str) -> Result<u64, RemoteError> {
        let body = self.read(url)?;
        Ok(body.len() as u64)
    }

    async fn open_stream(&self, url: &str) -> Result<ByteStream, RemoteError> {
        let body = self.read(url)?;
        let chunks: Vec<Result<Bytes, RemoteError>> = (0..body.len())
            .step_by(STREAM_CHUNK_BYTES)
            .map(|start| {
                let end = (start + STREAM_CHUNK_BYTES).min(body.len());
                Ok(body.slice(start..end))
            })
            .collect();
        Ok(stream::iter(chunks).boxed())
    }

    async fn put_bytes(&self, url: &str, body: Bytes) -> Result<(), RemoteError> {
        self.check_url(url)?;
        self.lock().files.insert(url.to_string(), body);
        Ok(())
    }

    async fn exists(&self, url: &str) -> Result<bool, RemoteError> {
        self.check_url(url)?;
        let store = self.lock();
        Ok(store.files.contains_key(url) || store.folder_exists(url))
    }

    async fn ensure_parent(&self, url: &str) -> Result<(), RemoteError> {
        self.check_url(url)?;
        self.lock().folders.insert(parent_url(url).to_string());
        Ok(())
    }

    async fn remove(&self, url: &str) -> Result<(), RemoteError> {
        self.check_url(url)?;
        self.lock()
            .files
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found(url))
    }

    async fn remove_tree(&self, url: &str) -> Result<(), RemoteError> {
        self.check_url(url)?;
        let folder = url.trim_end_matches('/');
        let prefix = format!("{folder}/");
        let mut store = self.lock();
        if !store.folder_exists(folder) {
            return Err(RemoteError::not_found(url));
        }
        store.files.retain(|key, _| !key.starts_with(&prefix));
        store
            .folders
            .retain(|key| key != folder && !key.starts_with(&prefix));
        Ok(())
    }

    async fn list_children(&self, url: &str) -> Result<Vec<String>, RemoteError> {
        self.check_url(url)?;
        let folder = url.trim_end_matches('/');
        let prefix = format!("{folder}/");
        let store = self.lock();
        if !store.folder_exists(folder) {
            return Err(RemoteError::not_found(url));
        }
        let children: BTreeSet<String> = store
            .files
            .keys()
            .chain(store.folders.iter())
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|segment| !segment.is_empty())
            .map(|segment| format!("{prefix}{segment}"))
            .collect();
        Ok(children.into_iter().collect())
    }

    async fn list_versions(
        &self,
        repository: &str,
        group_id: &str,
        name: &str,
        pattern: &str,
    ) -> Result<Vec<String>, RemoteError> {
        let artifact_url = artifact_base_url(&self.root, repository, group_id, Some(name), None);
        let children = self.list_children(&artifact_url).await?;
        let versions: Vec<String> = children
            .iter()
            .filter_map(|child| child.rsplit('/').next())
            .filter(|version| matches_pattern(version, pattern))
            .map(ToString::to_string)
            .collect();
        if versions.is_empty() {
            return Err(RemoteError::not_found(artifact_url));
        }
        Ok(versions)
    }
}
