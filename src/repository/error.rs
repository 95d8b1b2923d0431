//! Error types for repository, resolver, and transfer operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::remote::RemoteError;

/// Errors that can occur while resolving, listing, or transferring artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The remote store failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The repository configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A fetched document could not be parsed as a POM.
    #[error(
        "malformed document at {url}: {reason}\n  Suggestion: Check that the URL points to a POM file"
    )]
    MalformedDocument {
        /// Where the document came from.
        url: String,
        /// Parser error.
        reason: String,
    },

    /// A version search pattern is neither a glob nor a snapshot.
    #[error(
        "version pattern '{pattern}' not valid\n  Suggestion: Use a pattern ending with '-SNAPSHOT' or including '*'"
    )]
    InvalidVersionPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// The version search matched nothing.
    #[error("no version found for group_id '{group_id}', name '{name}', pattern '{pattern}'")]
    NoVersions {
        /// Searched group ID.
        group_id: String,
        /// Searched artifact name.
        name: String,
        /// Searched pattern.
        pattern: String,
    },

    /// A dependency key is not of the form `group:name:version`.
    #[error("invalid coordinate '{input}': expected 'group_id:name:version'")]
    InvalidCoordinate {
        /// The rejected input.
        input: String,
    },

    /// A dependency filter is not a valid regular expression.
    #[error("invalid dependency filter '{pattern}': {reason}")]
    InvalidFilter {
        /// The rejected pattern.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// An artifact URL lies outside the configured repository.
    #[error("{url} has to start with {repository_url}")]
    OutsideRepository {
        /// The rejected URL.
        url: String,
        /// Expected prefix.
        repository_url: String,
    },

    /// A local file name does not follow the `{name}-{version}.{ext}` convention.
    #[error("file name '{file_name}' does not match '{expected}'")]
    FilenameMismatch {
        /// File name found.
        file_name: String,
        /// File name prefix expected from the target URL.
        expected: String,
    },

    /// A local path cannot be read or written.
    #[error("IO error at {path}: {source}")]
    LocalIo {
        /// The local path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Transitive resolution nested deeper than allowed, usually a cycle.
    #[error(
        "dependency depth limit {max_depth} exceeded at '{coordinate}'\n  Suggestion: Check the POMs for a dependency cycle"
    )]
    DepthExceeded {
        /// The dependency being resolved when the limit was hit.
        coordinate: String,
        /// The configured limit.
        max_depth: usize,
    },
}

impl ArtifactError {
    /// Creates a malformed document error.
    pub fn malformed_document(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid version pattern error.
    pub fn invalid_version_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidVersionPattern {
            pattern: pattern.into(),
        }
    }

    /// Creates an empty version search error.
    pub fn no_versions(
        group_id: impl Into<String>,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self::NoVersions {
            group_id: group_id.into(),
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Creates an invalid coordinate error.
    pub fn invalid_coordinate(input: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            input: input.into(),
        }
    }

    /// Creates an invalid filter error.
    pub fn invalid_filter(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Creates an outside-repository error.
    pub fn outside_repository(url: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self::OutsideRepository {
            url: url.into(),
            repository_url: repository_url.into(),
        }
    }

    /// Creates a file name convention error.
    pub fn filename_mismatch(file_name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::FilenameMismatch {
            file_name: file_name.into(),
            expected: expected.into(),
        }
    }

    /// Creates a local IO error.
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Creates a depth limit error.
    pub fn depth_exceeded(coordinate: impl Into<String>, max_depth: usize) -> Self {
        Self::DepthExceeded {
            coordinate: coordinate.into(),
            max_depth,
        }
    }
}
