//! Artifactory Client Library
//!
//! This library talks to a binary-artifact repository server with a Maven
//! layout (Artifactory flavour). It resolves artifact coordinates to URLs,
//! transfers artifact files, walks POM dependency graphs and keeps
//! versioned CSV lookup tables on the server.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Explicit client configuration with defaults and env overrides
//! - [`coordinates`] - Pure mapping between coordinates and repository URLs
//! - [`version`] - Version ordering and version pattern checks
//! - [`pom`] - Read-only access to parsed POM documents
//! - [`dependencies`] - Dependency extraction and tree transforms
//! - [`remote`] - The [`Remote`] trait with HTTP and in-memory backends
//! - [`repository`] - The [`Repository`] facade: versions, POMs, resolution, transfer
//! - [`lookup`] - CSV lookup tables stored in a repository

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod coordinates;
pub mod dependencies;
pub mod lookup;
pub mod pom;
pub mod remote;
pub mod repository;
pub mod version;

mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, Credentials, RepositoryConfig};
pub use coordinates::Coordinate;
pub use dependencies::{
    DependencyNode, DependencyTree, direct_dependencies, exclude_dependencies,
    include_dependencies, list_artifacts, render_dependencies,
};
pub use lookup::{Lookup, LookupError, LookupOptions, Params, Table, Value};
pub use pom::Pom;
pub use remote::{HttpRemote, MemoryRemote, Remote, RemoteError};
pub use repository::{ArtifactError, Repository};
pub use version::sort_versions;
