//! Dependency extraction, resolution and tree transforms.
//!
//! [`direct_dependencies`] reads the dependency list of a single POM.
//! Transitive resolution lives on [`crate::repository::Repository`] because
//! it needs the remote; the tree walkers in this module are pure.

mod tree;

pub use tree::{
    DependencyNode, DependencyTree, exclude_dependencies, include_dependencies, list_artifacts,
    render_dependencies,
};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::coordinates::Coordinate;
use crate::pom::{self, POM_PACKAGING, Pom};
use crate::repository::{ArtifactError, Repository};

/// Direct dependencies of `pom` as sorted `group:name:version` strings.
///
/// A single `<dependency>` is treated like a list of one. Entries that are
/// not elements with children are skipped; missing fields read as `""`.
#[must_use]
pub fn direct_dependencies(pom: &Pom) -> Vec<String> {
    let entries = match pom
        .node("dependencies")
        .and_then(|dependencies| dependencies.get("dependency"))
    {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };
    let mut dependencies: Vec<String> = entries
        .into_iter()
        .filter(|entry| entry.is_object())
        .map(|entry| {
            format!(
                "{}:{}:{}",
                pom::attribute(entry, "groupId"),
                pom::attribute(entry, "artifactId"),
                pom::attribute(entry, "version"),
            )
        })
        .collect();
    dependencies.sort();
    dependencies
}

/// Recursive step of [`Repository::transitive_dependencies`].
///
/// `depth` counts the POMs already fetched above `pom`.
pub(crate) fn resolve(
    repository: &Repository,
    pom: Pom,
    depth: usize,
) -> BoxFuture<'_, Result<DependencyNode, ArtifactError>> {
    async move {
        let packaging = pom.packaging_type();
        if packaging != POM_PACKAGING {
            return Ok(DependencyNode::leaf(packaging));
        }

        let max_depth = repository.config().max_dependency_depth;
        let mut children = DependencyTree::new();
        for dependency in direct_dependencies(&pom) {
            if depth >= max_depth {
                return Err(ArtifactError::depth_exceeded(dependency, max_depth));
            }
            let coordinate: Coordinate = dependency.parse()?;
            let url = coordinate.metadata_url(repository.root(), &repository.config().repository);
            debug!(dependency = %dependency, depth, "resolving dependency");
            let child = repository.download_pom(&url).await?;
            let node = resolve(repository, child, depth + 1).await?;
            children.insert(dependency, node);
        }
        Ok(DependencyNode::Branch(children))
    }
    .boxed()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pom::tests::{EMPTY_POM, EXAMPLE_POM};

    #[test]
    fn test_direct_dependencies_are_sorted() {
        let pom = Pom::parse(EXAMPLE_POM, "example.pom").unwrap();
        assert_eq!(
            direct_dependencies(&pom),
            vec![
                "com.audeering.data.database:database-data:1.0.1",
                "com.audeering.data.database:database-metadata:2.1.0",
            ]
        );
    }

    #[test]
    fn test_direct_dependencies_of_empty_pom() {
        let pom = Pom::parse(EMPTY_POM, "empty.pom").unwrap();
        assert!(direct_dependencies(&pom).is_empty());
    }

    #[test]
    fn test_single_dependency_is_a_list_of_one() {
        let xml = "<project><dependencies><dependency>\
                   <groupId>g</groupId><artifactId>a</artifactId><version>1</version>\
                   </dependency></dependencies></project>";
        let pom = Pom::parse(xml, "single.pom").unwrap();
        assert_eq!(direct_dependencies(&pom), vec!["g:a:1"]);
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let pom = Pom::from_value(serde_json::json!({
            "project": {
                "dependencies": {
                    "dependency": [
                        "text",
                        null,
                        {"groupId": "g", "artifactId": "a"},
                    ]
                }
            }
        }));
        assert_eq!(direct_dependencies(&pom), vec!["g:a:"]);
    }

    #[test]
    fn test_malformed_dependencies_read_as_empty() {
        let pom = Pom::from_value(serde_json::json!({
            "project": {"dependencies": "none"}
        }));
        assert!(direct_dependencies(&pom).is_empty());
    }
}
