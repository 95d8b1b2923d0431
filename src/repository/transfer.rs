//! Artifact downloads and uploads.
//!
//! Downloads stream the body chunk by chunk into the target file. A
//! [`PartialFile`] guard removes the file again unless the transfer ran to
//! completion, which also covers a download future dropped mid-way.

use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::{ArtifactError, Repository};
use crate::coordinates::{artifact_url, relative_to_repository};
use crate::remote::RemoteError;
use crate::version::SNAPSHOT_SUFFIX;

/// Removes the file at `path` on drop unless disarmed.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed {
            debug!(path = %self.path.display(), "cleaning up partial file");
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Last path segment of `url`, ignoring query and fragment.
fn url_file_name(url: &str) -> Result<String, ArtifactError> {
    let parsed = url::Url::parse(url).map_err(|_| RemoteError::invalid_url(url))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| RemoteError::invalid_url(url).into())
}

/// Joins a `/`-separated server path below `destination`.
fn local_path(destination: &Path, relative: &str, url: &str, repository_url: &str) -> Result<PathBuf, ArtifactError> {
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(ArtifactError::outside_repository(url, repository_url));
    }
    Ok(destination.join(relative))
}

async fn file_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

impl Repository {
    /// Downloads `urls` below `destination`, mirroring the server layout.
    ///
    /// A file that already exists locally is kept unless `force` is set.
    /// Returns the local path of every URL, downloaded or not, in input
    /// order.
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::OutsideRepository`] if any URL does not start with
    ///   the configured repository URL; checked before anything is fetched
    /// - [`ArtifactError::LocalIo`] if a file or folder cannot be written
    /// - [`ArtifactError::Remote`] if a download fails
    #[instrument(skip(self, urls), fields(count = urls.len(), destination = %destination.display()))]
    pub async fn download_artifacts<S: AsRef<str>>(
        &self,
        urls: &[S],
        destination: &Path,
        force: bool,
    ) -> Result<Vec<PathBuf>, ArtifactError> {
        let repository_url = self.config.repository_url();
        let mut targets = Vec::with_capacity(urls.len());
        for url in urls {
            let url = url.as_ref();
            let relative = relative_to_repository(url, &self.config.root, &self.config.repository)?;
            targets.push((url, local_path(destination, relative, url, &repository_url)?));
        }

        fs::create_dir_all(destination)
            .await
            .map_err(|error| ArtifactError::local_io(destination, error))?;

        let mut paths = Vec::with_capacity(targets.len());
        for (url, path) in targets {
            if force || !file_exists(&path).await {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .await
                        .map_err(|error| ArtifactError::local_io(parent, error))?;
                }
                self.fetch_to_file(url, &path).await?;
            } else {
                debug!(path = %path.display(), "already downloaded, skipping");
            }
            paths.push(path);
        }
        info!(count = paths.len(), "artifacts available locally");
        Ok(paths)
    }

    /// Downloads a single artifact.
    ///
    /// `destination` is either an existing folder, in which case the file
    /// name is taken from the URL, or a file path whose parent exists.
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::LocalIo`] if the destination folder does not exist
    /// - [`ArtifactError::Remote`] if `url` is invalid or the download fails
    #[instrument(skip(self), fields(url = %url, destination = %destination.display()))]
    pub async fn download_artifact(
        &self,
        url: &str,
        destination: &Path,
        force: bool,
    ) -> Result<PathBuf, ArtifactError> {
        let path = if fs::metadata(destination)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            destination.join(url_file_name(url)?)
        } else {
            destination.to_path_buf()
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !fs::metadata(&parent)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            return Err(ArtifactError::local_io(
                parent,
                io::Error::new(io::ErrorKind::NotFound, "destination folder does not exist"),
            ));
        }

        if !force && file_exists(&path).await {
            debug!(path = %path.display(), "already downloaded, skipping");
            return Ok(path);
        }
        self.fetch_to_file(url, &path).await?;
        Ok(path)
    }

    /// Uploads `path` as `group_id:name:version` into the configured
    /// repository and returns the artifact URL.
    ///
    /// The extension of the local file becomes the artifact extension.
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::FilenameMismatch`] if `path` has no extension
    /// - see [`Repository::deploy_artifact`]
    pub async fn upload_artifact(
        &self,
        path: &Path,
        group_id: &str,
        name: &str,
        version: &str,
    ) -> Result<String, ArtifactError> {
        let Some(extension) = path.extension().and_then(|extension| extension.to_str()) else {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(ArtifactError::filename_mismatch(
                file_name,
                format!("{name}-{version}.<extension>"),
            ));
        };
        let url = artifact_url(
            &self.config.root,
            &self.config.repository,
            group_id,
            name,
            version,
            extension,
        );
        self.deploy_artifact(path, &url).await?;
        Ok(url)
    }

    /// Uploads `path` to `url`, creating the parent folder if needed.
    ///
    /// The file name in `url` has to be `{name}-{version}.{extension}` for
    /// its `.../{name}/{version folder}/` location; inside a `-SNAPSHOT`
    /// folder any qualifier of the base version is accepted.
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::FilenameMismatch`] if the file name does not fit
    /// - [`ArtifactError::LocalIo`] if `path` cannot be read
    /// - [`ArtifactError::Remote`] if the upload fails
    #[instrument(skip(self), fields(path = %path.display(), url = %url))]
    pub async fn deploy_artifact(&self, path: &Path, url: &str) -> Result<(), ArtifactError> {
        check_deploy_file_name(url)?;
        let body = fs::read(path)
            .await
            .map_err(|error| ArtifactError::local_io(path, error))?;
        let size = body.len();
        self.remote.ensure_parent(url).await?;
        self.remote.put_bytes(url, Bytes::from(body)).await?;
        info!(bytes = size, "artifact deployed");
        Ok(())
    }

    /// Streams `url` into `path`, removing the file again on failure.
    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64, ArtifactError> {
        let mut stream = self.remote.open_stream(url).await?;
        let file = File::create(path)
            .await
            .map_err(|error| ArtifactError::local_io(path, error))?;
        let mut guard = PartialFile::new(path);
        let mut writer = BufWriter::new(file);
        let mut bytes_written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|error| ArtifactError::local_io(path, error))?;
            bytes_written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|error| ArtifactError::local_io(path, error))?;
        drop(writer);
        guard.disarm();
        debug!(url = %url, path = %path.display(), bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }
}

fn check_deploy_file_name(url: &str) -> Result<(), ArtifactError> {
    let file_name = url_file_name(url)?;
    let mut segments = url.trim_end_matches('/').rsplit('/').skip(1);
    let (Some(folder), Some(name)) = (segments.next(), segments.next()) else {
        return Err(RemoteError::invalid_url(url).into());
    };
    let expected = match folder.strip_suffix(SNAPSHOT_SUFFIX) {
        Some(base) => format!("{name}-{base}-"),
        None => format!("{name}-{folder}."),
    };
    let Some(rest) = file_name.strip_prefix(&expected) else {
        return Err(ArtifactError::filename_mismatch(file_name, expected));
    };
    let has_extension = if folder.ends_with(SNAPSHOT_SUFFIX) {
        rest.contains('.') && !rest.ends_with('.')
    } else {
        !rest.is_empty()
    };
    if has_extension {
        Ok(())
    } else {
        Err(ArtifactError::filename_mismatch(file_name, expected))
    }
}
