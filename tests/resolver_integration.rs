//! Integration tests for transitive dependency resolution.
//!
//! POM documents are served from an in-memory remote laid out like the
//! emodb database release on the production server.

use std::sync::Arc;

use artifactory_client::config::RepositoryConfig;
use artifactory_client::dependencies::{
    DependencyNode, exclude_dependencies, include_dependencies, list_artifacts,
    render_dependencies,
};
use artifactory_client::pom::Pom;
use artifactory_client::remote::MemoryRemote;
use artifactory_client::repository::{ArtifactError, Repository};
use tempfile::TempDir;

const ROOT: &str = "https://artifactory.example.com/artifactory";

fn pom(group_id: &str, name: &str, version: &str, packaging: &str, dependencies: &[&str]) -> String {
    let dependencies: String = dependencies
        .iter()
        .map(|coordinate| {
            let mut parts = coordinate.split(':');
            let (group_id, name, version) = (
                parts.next().unwrap_or_default(),
                parts.next().unwrap_or_default(),
                parts.next().unwrap_or_default(),
            );
            format!(
                "<dependency><groupId>{group_id}</groupId><artifactId>{name}</artifactId>\
                 <version>{version}</version></dependency>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{group_id}</groupId>
  <artifactId>{name}</artifactId>
  <version>{version}</version>
  <packaging>{packaging}</packaging>
  <dependencies>{dependencies}</dependencies>
</project>"#
    )
}

fn publish(
    repository: &Repository,
    remote: &MemoryRemote,
    coordinate: &str,
    packaging: &str,
    dependencies: &[&str],
) {
    let parts: Vec<&str> = coordinate.split(':').collect();
    let url = repository.pom_url(parts[0], parts[1], parts[2]);
    remote.insert(url, pom(parts[0], parts[1], parts[2], packaging, dependencies));
}

/// emodb database: data (pom, depends on the raw corpus) and metadata (zip).
fn emodb() -> (Repository, Arc<MemoryRemote>) {
    let remote = Arc::new(MemoryRemote::new(ROOT));
    let repository = Repository::with_remote(remote.clone(), RepositoryConfig::new(ROOT, "maven"));
    publish(
        &repository,
        &remote,
        "com.audeering.data.emodb:emodb:0.2.2",
        "pom",
        &[
            "com.audeering.data.emodb:emodb-metadata:0.2.2",
            "com.audeering.data.emodb:emodb-data:0.2.2",
        ],
    );
    publish(
        &repository,
        &remote,
        "com.audeering.data.emodb:emodb-data:0.2.2",
        "pom",
        &["info.bilderbar.emodb:emodb:1.0.0"],
    );
    publish(
        &repository,
        &remote,
        "com.audeering.data.emodb:emodb-metadata:0.2.2",
        "zip",
        &[],
    );
    publish(&repository, &remote, "info.bilderbar.emodb:emodb:1.0.0", "zip", &[]);
    (repository, remote)
}

async fn resolve_emodb(repository: &Repository) -> DependencyNode {
    let url = repository.pom_url("com.audeering.data.emodb", "emodb", "0.2.2");
    let pom = repository.download_pom(&url).await.expect("root POM should download");
    repository
        .transitive_dependencies(&pom)
        .await
        .expect("resolution should succeed")
}

#[tokio::test]
async fn test_transitive_dependencies_of_emodb() {
    let (repository, _remote) = emodb();
    let node = resolve_emodb(&repository).await;
    let expected = DependencyNode::branch([
        (
            "com.audeering.data.emodb:emodb-data:0.2.2",
            DependencyNode::branch([("info.bilderbar.emodb:emodb:1.0.0", DependencyNode::leaf("zip"))]),
        ),
        (
            "com.audeering.data.emodb:emodb-metadata:0.2.2",
            DependencyNode::leaf("zip"),
        ),
    ]);
    assert_eq!(node, expected);

    let tree = node.as_tree().expect("root should be a branch");
    let keys: Vec<&str> = tree.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        [
            "com.audeering.data.emodb:emodb-data:0.2.2",
            "com.audeering.data.emodb:emodb-metadata:0.2.2",
        ],
        "dependencies are resolved in sorted order"
    );
}

#[tokio::test]
async fn test_render_resolved_tree() {
    let (repository, _remote) = emodb();
    let node = resolve_emodb(&repository).await;
    let tree = node.as_tree().expect("root should be a branch");
    assert_eq!(
        render_dependencies(tree),
        "+-com.audeering.data.emodb:emodb-data:0.2.2\n\
         | +-info.bilderbar.emodb:emodb:1.0.0 (zip)\n\
         +-com.audeering.data.emodb:emodb-metadata:0.2.2 (zip)\n"
    );
}

#[tokio::test]
async fn test_filter_and_download_resolved_artifacts() {
    let (repository, remote) = emodb();
    let node = resolve_emodb(&repository).await;
    let tree = node.as_tree().expect("root should be a branch");

    let raw_only = include_dependencies(tree, r"info\.bilderbar").expect("valid filter");
    let without_raw = exclude_dependencies(tree, r"info\.bilderbar").expect("valid filter");
    assert_eq!(
        list_artifacts(&raw_only, ROOT, "maven").expect("valid keys"),
        vec![format!(
            "{ROOT}/maven/info/bilderbar/emodb/emodb/1.0.0/emodb-1.0.0.zip"
        )]
    );
    let urls = list_artifacts(&without_raw, ROOT, "maven").expect("valid keys");
    assert_eq!(
        urls,
        vec![format!(
            "{ROOT}/maven/com/audeering/data/emodb/emodb-metadata/0.2.2/emodb-metadata-0.2.2.zip"
        )]
    );

    remote.insert(urls[0].clone(), "metadata archive");
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let paths = repository
        .download_artifacts(&urls, temp_dir.path(), false)
        .await
        .expect("download should succeed");
    assert_eq!(
        paths,
        vec![temp_dir.path().join(
            "com/audeering/data/emodb/emodb-metadata/0.2.2/emodb-metadata-0.2.2.zip"
        )]
    );
    assert_eq!(
        std::fs::read_to_string(&paths[0]).expect("should read file"),
        "metadata archive"
    );
}

#[tokio::test]
async fn test_non_pom_packaging_is_a_leaf() {
    let (repository, _remote) = emodb();
    let url = repository.pom_url("info.bilderbar.emodb", "emodb", "1.0.0");
    let pom = repository.download_pom(&url).await.expect("POM should download");
    assert_eq!(
        repository.transitive_dependencies(&pom).await.expect("resolves"),
        DependencyNode::leaf("zip")
    );
}

#[tokio::test]
async fn test_missing_dependency_aborts_resolution() {
    let (repository, remote) = emodb();
    publish(
        &repository,
        &remote,
        "org.broken:top:1.0.0",
        "pom",
        &[
            "com.audeering.data.emodb:emodb-metadata:0.2.2",
            "org.broken:missing:1.0.0",
        ],
    );
    let url = repository.pom_url("org.broken", "top", "1.0.0");
    let pom = repository.download_pom(&url).await.expect("POM should download");
    let error = repository.transitive_dependencies(&pom).await.unwrap_err();
    assert!(
        matches!(error, ArtifactError::Remote(ref remote) if remote.is_not_found()),
        "got: {error:?}"
    );
}

#[tokio::test]
async fn test_dependency_cycle_hits_depth_limit() {
    let remote = Arc::new(MemoryRemote::new(ROOT));
    let mut config = RepositoryConfig::new(ROOT, "maven");
    config.max_dependency_depth = 8;
    let repository = Repository::with_remote(remote.clone(), config);
    publish(&repository, &remote, "org.cycle:a:1.0", "pom", &["org.cycle:b:1.0"]);
    publish(&repository, &remote, "org.cycle:b:1.0", "pom", &["org.cycle:a:1.0"]);

    let pom = repository
        .download_pom(&repository.pom_url("org.cycle", "a", "1.0"))
        .await
        .expect("POM should download");
    let error = repository.transitive_dependencies(&pom).await.unwrap_err();
    assert!(
        matches!(error, ArtifactError::DepthExceeded { max_depth: 8, .. }),
        "got: {error:?}"
    );
}

#[tokio::test]
async fn test_pom_without_dependencies_is_an_empty_branch() {
    let remote = Arc::new(MemoryRemote::new(ROOT));
    let repository = Repository::with_remote(remote.clone(), RepositoryConfig::new(ROOT, "maven"));
    publish(&repository, &remote, "org.empty:bom:1.0", "pom", &[]);
    let pom: Pom = repository
        .download_pom(&repository.pom_url("org.empty", "bom", "1.0"))
        .await
        .expect("POM should download");
    let node = repository.transitive_dependencies(&pom).await.expect("resolves");
    assert_eq!(node, DependencyNode::branch(Vec::<(String, DependencyNode)>::new()));
    assert_eq!(render_dependencies(node.as_tree().expect("branch")), "");
}
