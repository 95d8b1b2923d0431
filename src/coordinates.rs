//! Mapping between artifact coordinates and repository URLs.
//!
//! All functions here are pure string transformations. The layout follows
//! the Maven convention used by Artifactory:
//!
//! ```text
//! {root}/{repository}/{group/as/path}/{name}/{version folder}/{name}-{version}.{ext}
//! ```
//!
//! Timestamped snapshots (`2.0.0-20200131.102728-2`) are stored inside the
//! `2.0.0-SNAPSHOT` folder while keeping the full version in the file name.

use std::fmt;
use std::str::FromStr;

use crate::repository::ArtifactError;

/// File extension of metadata documents.
pub const POM_EXTENSION: &str = "pom";

/// An artifact identified by `group_id:name:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Dot-separated group ID, e.g. `com.audeering.data.emodb`.
    pub group_id: String,
    /// Artifact name (Maven `artifactId`).
    pub name: String,
    /// Version string, release or snapshot.
    pub version: String,
}

impl Coordinate {
    /// Creates a coordinate from its parts.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// URL of this coordinate's POM in `repository`.
    #[must_use]
    pub fn metadata_url(&self, root: &str, repository: &str) -> String {
        metadata_url(root, repository, &self.group_id, &self.name, &self.version)
    }

    /// URL of this coordinate's artifact file with the given extension.
    #[must_use]
    pub fn artifact_url(&self, root: &str, repository: &str, extension: &str) -> String {
        artifact_url(
            root,
            repository,
            &self.group_id,
            &self.name,
            &self.version,
            extension,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.name, self.version)
    }
}

impl FromStr for Coordinate {
    type Err = ArtifactError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(group_id), Some(name), Some(version), None) => {
                Ok(Self::new(group_id, name, version))
            }
            _ => Err(ArtifactError::invalid_coordinate(input)),
        }
    }
}

/// Replaces `.` by `/` in a group ID.
///
/// ```
/// use artifactory_client::coordinates::group_path;
/// assert_eq!(group_path("com.audeering.data.emodb"), "com/audeering/data/emodb");
/// ```
#[must_use]
pub fn group_path(group_id: &str) -> String {
    group_id.replace('.', "/")
}

/// Replaces `/` by `.` in a path, the inverse of [`group_path`].
#[must_use]
pub fn path_to_group(path: &str) -> String {
    path.replace('/', ".")
}

/// URL of a group, an artifact, or an artifact version folder.
///
/// `version` is only appended when `name` is given as well.
#[must_use]
pub fn artifact_base_url(
    root: &str,
    repository: &str,
    group_id: &str,
    name: Option<&str>,
    version: Option<&str>,
) -> String {
    let group = group_path(group_id);
    let path = match (name, version) {
        (Some(name), Some(version)) => format!("{group}/{name}/{version}"),
        (Some(name), None) => format!("{group}/{name}"),
        (None, _) => group,
    };
    format!("{root}/{repository}/{path}")
}

/// Returns true if `version` carries a qualifier after its base, e.g.
/// `1.0.0-SNAPSHOT` or `2.0.0-20200131.102728-2`.
#[must_use]
pub fn is_snapshot(version: &str) -> bool {
    version.contains('-')
}

/// Folder a version is stored in: `{base}-SNAPSHOT` for snapshots.
#[must_use]
pub fn version_folder(version: &str) -> String {
    match version.split_once('-') {
        Some((base, _)) => format!("{base}-SNAPSHOT"),
        None => version.to_string(),
    }
}

/// URL of the artifact file `{name}-{version}.{extension}`.
#[must_use]
pub fn artifact_url(
    root: &str,
    repository: &str,
    group_id: &str,
    name: &str,
    version: &str,
    extension: &str,
) -> String {
    let folder = version_folder(version);
    let base = artifact_base_url(root, repository, group_id, Some(name), Some(&folder));
    format!("{base}/{name}-{version}.{extension}")
}

/// URL of the POM describing `group_id:name:version`.
///
/// ```
/// use artifactory_client::coordinates::metadata_url;
/// let url = metadata_url("https://host/artifactory", "maven", "org.data", "d1", "0.1.0");
/// assert_eq!(url, "https://host/artifactory/maven/org/data/d1/0.1.0/d1-0.1.0.pom");
/// ```
#[must_use]
pub fn metadata_url(root: &str, repository: &str, group_id: &str, name: &str, version: &str) -> String {
    artifact_url(root, repository, group_id, name, version, POM_EXTENSION)
}

/// Path of `url` below `{root}/{repository}/`.
///
/// # Errors
///
/// Returns [`ArtifactError::OutsideRepository`] if `url` does not lie
/// below the repository URL, e.g. for a sibling repository `maven2`.
pub fn relative_to_repository<'a>(
    url: &'a str,
    root: &str,
    repository: &str,
) -> Result<&'a str, ArtifactError> {
    let repository_url = format!("{root}/{repository}");
    url.strip_prefix(&repository_url)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| rest.trim_start_matches('/'))
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| ArtifactError::outside_repository(url, repository_url.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ROOT: &str = "https://artifactory.audeering.com/artifactory";

    fn artifactory(path: &str) -> String {
        format!("{ROOT}/maven/{path}")
    }

    #[test]
    fn test_group_path_replaces_dots() {
        assert_eq!(group_path("com.audeering.data.raw"), "com/audeering/data/raw");
        assert_eq!(group_path("de.bilderbar.emodb"), "de/bilderbar/emodb");
    }

    #[test]
    fn test_path_to_group_inverts_group_path() {
        for group_id in ["com.audeering.data.raw", "de.bilderbar.emodb", "single"] {
            assert_eq!(path_to_group(&group_path(group_id)), group_id);
        }
    }

    #[test]
    fn test_artifact_base_url_levels() {
        assert_eq!(artifact_base_url(ROOT, "maven", "", None, None), artifactory(""));
        assert_eq!(
            artifact_base_url(ROOT, "maven", "com.audeering.data", None, None),
            artifactory("com/audeering/data")
        );
        assert_eq!(
            artifact_base_url(ROOT, "maven", "com.audeering.data", Some("database"), None),
            artifactory("com/audeering/data/database")
        );
        assert_eq!(
            artifact_base_url(
                ROOT,
                "maven",
                "com.audeering.data",
                Some("database"),
                Some("1.1.0")
            ),
            artifactory("com/audeering/data/database/1.1.0")
        );
    }

    #[test]
    fn test_artifact_base_url_ignores_version_without_name() {
        assert_eq!(
            artifact_base_url(ROOT, "maven", "com.audeering", None, Some("1.0.0")),
            artifactory("com/audeering")
        );
    }

    #[test]
    fn test_metadata_url_release() {
        assert_eq!(
            metadata_url(ROOT, "maven", "org.data.d1", "d1", "0.1.0"),
            artifactory("org/data/d1/d1/0.1.0/d1-0.1.0.pom")
        );
    }

    #[test]
    fn test_metadata_url_snapshot_placeholder() {
        assert_eq!(
            metadata_url(ROOT, "maven", "de.dfki.mary", "dfkisemaine", "0.3.0-SNAPSHOT"),
            artifactory("de/dfki/mary/dfkisemaine/0.3.0-SNAPSHOT/dfkisemaine-0.3.0-SNAPSHOT.pom")
        );
    }

    #[test]
    fn test_metadata_url_timestamped_snapshot_uses_snapshot_folder() {
        assert_eq!(
            metadata_url(
                ROOT,
                "maven",
                "com.audeering.data.audbunittests",
                "audbunittests",
                "2.0.0-20200131.102728-2"
            ),
            artifactory(
                "com/audeering/data/audbunittests/audbunittests/2.0.0-SNAPSHOT/\
                 audbunittests-2.0.0-20200131.102728-2.pom"
            )
        );
    }

    #[test]
    fn test_artifact_url_swaps_extension() {
        let coordinate = Coordinate::new("info.bilderbar.emodb", "emodb", "1.0.0");
        assert_eq!(
            coordinate.artifact_url(ROOT, "maven", "zip"),
            artifactory("info/bilderbar/emodb/emodb/1.0.0/emodb-1.0.0.zip")
        );
    }

    #[test]
    fn test_coordinate_round_trips_through_display() {
        let coordinate: Coordinate = "com.audeering.data.emodb:emodb-data:0.2.2".parse().unwrap();
        assert_eq!(coordinate.group_id, "com.audeering.data.emodb");
        assert_eq!(coordinate.name, "emodb-data");
        assert_eq!(coordinate.version, "0.2.2");
        assert_eq!(
            coordinate.to_string(),
            "com.audeering.data.emodb:emodb-data:0.2.2"
        );
    }

    #[test]
    fn test_coordinate_rejects_wrong_arity() {
        assert!("a:b".parse::<Coordinate>().is_err());
        assert!("a:b:c:d".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_relative_to_repository() {
        let url = artifactory("a/b/1.0/b-1.0.zip");
        assert_eq!(
            relative_to_repository(&url, ROOT, "maven").unwrap(),
            "a/b/1.0/b-1.0.zip"
        );
        let error = relative_to_repository("https://other.com/x.zip", ROOT, "maven").unwrap_err();
        assert!(matches!(error, ArtifactError::OutsideRepository { .. }));
        for url in [
            format!("{ROOT}/maven2/x/y.zip"),
            format!("{ROOT}/maven"),
            format!("{ROOT}/maven/"),
        ] {
            assert!(
                matches!(
                    relative_to_repository(&url, ROOT, "maven"),
                    Err(ArtifactError::OutsideRepository { .. })
                ),
                "accepted: {url}"
            );
        }
    }
}
