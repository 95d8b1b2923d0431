//! Dependency tree type and pure tree transforms.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use indexmap::IndexMap;
use regex::Regex;

use crate::coordinates::Coordinate;
use crate::repository::ArtifactError;

/// Mapping from `group:name:version` to the resolved node, in declaration order.
pub type DependencyTree = IndexMap<String, DependencyNode>;

/// A resolved dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyNode {
    /// The dependency is a POM with further dependencies.
    Branch(DependencyTree),
    /// The dependency is a terminal artifact; holds its packaging type.
    Leaf(String),
}

impl DependencyNode {
    /// Creates a leaf with the given packaging type.
    #[must_use]
    pub fn leaf(packaging: impl Into<String>) -> Self {
        Self::Leaf(packaging.into())
    }

    /// Creates a branch from `(coordinate, node)` pairs.
    #[must_use]
    pub fn branch<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DependencyNode)>,
    {
        Self::Branch(
            children
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
        )
    }

    /// The subtree, if this is a branch.
    #[must_use]
    pub fn as_tree(&self) -> Option<&DependencyTree> {
        match self {
            Self::Branch(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }
}

/// Compiles a filter anchored at the start of each key.
fn compile_filter(pattern: &str) -> Result<Regex, ArtifactError> {
    Regex::new(&format!("^(?:{pattern})"))
        .map_err(|error| ArtifactError::invalid_filter(pattern, error.to_string()))
}

/// Keeps dependencies whose key matches `pattern`.
///
/// Matching keys are kept with their whole subtree. Non-matching branches
/// are kept only if something below them matches.
///
/// # Errors
///
/// Returns [`ArtifactError::InvalidFilter`] if `pattern` is not a valid regex.
pub fn include_dependencies(
    tree: &DependencyTree,
    pattern: &str,
) -> Result<DependencyTree, ArtifactError> {
    let filter = compile_filter(pattern)?;
    Ok(include_matching(tree, &filter))
}

fn include_matching(tree: &DependencyTree, filter: &Regex) -> DependencyTree {
    let mut filtered = DependencyTree::new();
    for (key, node) in tree {
        if filter.is_match(key) {
            filtered.insert(key.clone(), node.clone());
        } else if let DependencyNode::Branch(children) = node {
            let sub_tree = include_matching(children, filter);
            if !sub_tree.is_empty() {
                filtered.insert(key.clone(), DependencyNode::Branch(sub_tree));
            }
        }
    }
    filtered
}

/// Drops dependencies whose key matches `pattern`.
///
/// Branches left empty after filtering are dropped as well.
///
/// # Errors
///
/// Returns [`ArtifactError::InvalidFilter`] if `pattern` is not a valid regex.
pub fn exclude_dependencies(
    tree: &DependencyTree,
    pattern: &str,
) -> Result<DependencyTree, ArtifactError> {
    let filter = compile_filter(pattern)?;
    Ok(exclude_matching(tree, &filter))
}

fn exclude_matching(tree: &DependencyTree, filter: &Regex) -> DependencyTree {
    let mut filtered = DependencyTree::new();
    for (key, node) in tree {
        if filter.is_match(key) {
            continue;
        }
        match node {
            DependencyNode::Branch(children) => {
                let sub_tree = exclude_matching(children, filter);
                if !sub_tree.is_empty() {
                    filtered.insert(key.clone(), DependencyNode::Branch(sub_tree));
                }
            }
            DependencyNode::Leaf(_) => {
                filtered.insert(key.clone(), node.clone());
            }
        }
    }
    filtered
}

/// URLs of all artifact files referenced by the leaves of `tree`.
///
/// The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns [`ArtifactError::InvalidCoordinate`] if a leaf key is not of the
/// form `group:name:version`.
pub fn list_artifacts(
    tree: &DependencyTree,
    root: &str,
    repository: &str,
) -> Result<Vec<String>, ArtifactError> {
    let mut urls = BTreeSet::new();
    collect_artifacts(tree, root, repository, &mut urls)?;
    Ok(urls.into_iter().collect())
}

fn collect_artifacts(
    tree: &DependencyTree,
    root: &str,
    repository: &str,
    urls: &mut BTreeSet<String>,
) -> Result<(), ArtifactError> {
    for (key, node) in tree {
        match node {
            DependencyNode::Branch(children) => {
                collect_artifacts(children, root, repository, urls)?;
            }
            DependencyNode::Leaf(extension) => {
                let coordinate: Coordinate = key.parse()?;
                urls.insert(coordinate.artifact_url(root, repository, extension));
            }
        }
    }
    Ok(())
}

/// Renders `tree` as an ASCII outline.
///
/// ```text
/// +-com.audeering.data.emodb:emodb-data:0.2.2
/// | +-info.bilderbar.emodb:emodb:1.0.0 (zip)
/// +-com.audeering.data.emodb:emodb-metadata:0.2.2 (zip)
/// ```
#[must_use]
pub fn render_dependencies(tree: &DependencyTree) -> String {
    let mut output = String::new();
    render_into(tree, "", &mut output);
    output
}

fn render_into(tree: &DependencyTree, prefix: &str, output: &mut String) {
    let last_index = tree.len().saturating_sub(1);
    for (index, (key, node)) in tree.iter().enumerate() {
        match node {
            DependencyNode::Branch(children) => {
                let _ = writeln!(output, "{prefix}+-{key}");
                let continuation = if index < last_index { "| " } else { "  " };
                render_into(children, &format!("{prefix}{continuation}"), output);
            }
            DependencyNode::Leaf(packaging) => {
                let _ = writeln!(output, "{prefix}+-{key} ({packaging})");
            }
        }
    }
}
