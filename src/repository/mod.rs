//! Repository facade.
//!
//! [`Repository`] bundles a [`Remote`] with the [`RepositoryConfig`] it was
//! created for and exposes everything that needs both: version listing,
//! POM download, transitive dependency resolution and artifact transfer.
//!
//! # Example
//!
//! ```no_run
//! use artifactory_client::config::RepositoryConfig;
//! use artifactory_client::repository::Repository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Repository::new(RepositoryConfig::default())?;
//! let versions = repository
//!     .versions("com.audeering.data.emodb", "emodb", None)
//!     .await?;
//! println!("{versions:?}");
//! # Ok(())
//! # }
//! ```

mod error;
mod transfer;

pub use error::ArtifactError;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::RepositoryConfig;
use crate::coordinates::metadata_url;
use crate::dependencies::{self, DependencyNode};
use crate::pom::Pom;
use crate::remote::{HttpRemote, Remote};
use crate::version::{MATCH_ALL, sort_versions, validate_version_pattern};

/// A repository server reached through a [`Remote`].
///
/// Cloning is cheap; clones share the remote.
#[derive(Clone)]
pub struct Repository {
    remote: Arc<dyn Remote>,
    config: RepositoryConfig,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.remote.root())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Connects to the server described by `config` over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Config`] if `config` does not validate and
    /// [`ArtifactError::Remote`] if the HTTP client cannot be built.
    pub fn new(config: RepositoryConfig) -> Result<Self, ArtifactError> {
        config.validate()?;
        let remote = HttpRemote::new(&config)?;
        Ok(Self::with_remote(Arc::new(remote), config))
    }

    /// Uses an existing remote, e.g. a [`crate::remote::MemoryRemote`].
    #[must_use]
    pub fn with_remote(remote: Arc<dyn Remote>, config: RepositoryConfig) -> Self {
        Self { remote, config }
    }

    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    #[must_use]
    pub fn remote(&self) -> &Arc<dyn Remote> {
        &self.remote
    }

    /// Server root, without trailing slash.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.config.root
    }

    /// URL of the POM of `group_id:name:version` in the configured repository.
    #[must_use]
    pub fn pom_url(&self, group_id: &str, name: &str, version: &str) -> String {
        metadata_url(
            &self.config.root,
            &self.config.repository,
            group_id,
            name,
            version,
        )
    }

    /// Sorted versions of `group_id:name` in the configured repository.
    ///
    /// `pattern` defaults to `*` (all versions).
    ///
    /// # Errors
    ///
    /// - [`ArtifactError::InvalidVersionPattern`] before any request is made
    /// - [`ArtifactError::NoVersions`] if the server reports an empty result
    /// - [`ArtifactError::Remote`] on transport failures, including `NotFound`
    pub async fn versions(
        &self,
        group_id: &str,
        name: &str,
        pattern: Option<&str>,
    ) -> Result<Vec<String>, ArtifactError> {
        self.versions_in(&self.config.repository, group_id, name, pattern)
            .await
    }

    /// Like [`Repository::versions`] but searches `repository`.
    ///
    /// # Errors
    ///
    /// See [`Repository::versions`].
    #[instrument(skip(self))]
    pub async fn versions_in(
        &self,
        repository: &str,
        group_id: &str,
        name: &str,
        pattern: Option<&str>,
    ) -> Result<Vec<String>, ArtifactError> {
        let pattern = pattern.unwrap_or(MATCH_ALL);
        validate_version_pattern(pattern)?;
        let found = self
            .remote
            .list_versions(repository, group_id, name, pattern)
            .await?;
        if found.is_empty() {
            return Err(ArtifactError::no_versions(group_id, name, pattern));
        }
        let versions = sort_versions(found);
        debug!(count = versions.len(), "versions found");
        Ok(versions)
    }

    /// Downloads and parses the POM at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Remote`] if the download fails and
    /// [`ArtifactError::MalformedDocument`] if the body is not XML.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download_pom(&self, url: &str) -> Result<Pom, ArtifactError> {
        let text = self.remote.fetch_text(url).await?;
        Pom::parse(&text, url)
    }

    /// Resolves the dependency graph below `pom`.
    ///
    /// A POM with packaging `pom` becomes a [`DependencyNode::Branch`] of its
    /// resolved direct dependencies; anything else becomes a
    /// [`DependencyNode::Leaf`] holding the packaging type. Dependency POMs
    /// are fetched one after another in sorted order.
    ///
    /// # Errors
    ///
    /// Any failed fetch or parse aborts the whole resolution.
    /// [`ArtifactError::DepthExceeded`] is returned when nesting exceeds
    /// [`RepositoryConfig::max_dependency_depth`].
    #[instrument(skip(self, pom), fields(artifact = %pom.name(), version = %pom.version()))]
    pub async fn transitive_dependencies(&self, pom: &Pom) -> Result<DependencyNode, ArtifactError> {
        let node = dependencies::resolve(self, pom.clone(), 0).await?;
        info!("dependencies resolved");
        Ok(node)
    }
}
