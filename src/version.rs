//! Ordering of release and snapshot versions.
//!
//! Generic version sorting places `1.0.0-SNAPSHOT` after `1.0.0` and orders
//! timestamped snapshot builds by plain string comparison, neither of which
//! matches how a repository publishes them. [`sort_versions`] produces the
//! publication order instead:
//!
//! ```text
//! 0.0.1
//! 1.0.0-SNAPSHOT
//! 1.0.0-20200131.093409-1
//! 1.0.0
//! 2.0.0-20200131.093409-1
//! 2.0.0-20200131.102728-2
//! 2.0.0
//! 3.0.0
//! ```

use std::cmp::Ordering;

use crate::repository::ArtifactError;

/// Suffix of snapshot placeholder versions and snapshot folders.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Pattern matching every version of an artifact.
pub const MATCH_ALL: &str = "*";

/// Where a version sits relative to the release sharing its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    /// `X.Y.Z-SNAPSHOT`
    Placeholder,
    /// `X.Y.Z-{qualifier}`, e.g. a timestamped snapshot build.
    Qualified,
    /// `X.Y.Z`
    Release,
}

#[derive(Debug)]
struct VersionKey<'a> {
    base: &'a str,
    stage: Stage,
    qualifier: &'a str,
}

impl<'a> VersionKey<'a> {
    fn parse(version: &'a str) -> Self {
        match version.split_once('-') {
            None => Self {
                base: version,
                stage: Stage::Release,
                qualifier: "",
            },
            Some((base, "SNAPSHOT")) => Self {
                base,
                stage: Stage::Placeholder,
                qualifier: "",
            },
            Some((base, qualifier)) => Self {
                base,
                stage: Stage::Qualified,
                qualifier,
            },
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        compare_segments(self.base, other.base, &['.'])
            .then(self.stage.cmp(&other.stage))
            .then_with(|| compare_segments(self.qualifier, other.qualifier, &['.', '-']))
    }
}

/// Compares dotted strings segment by segment. Integer segments sort
/// numerically and before any text segment. A strict prefix sorts first.
fn compare_segments(left: &str, right: &str, separators: &[char]) -> Ordering {
    let mut left_parts = left.split(separators);
    let mut right_parts = right.split(separators);
    loop {
        match (left_parts.next(), right_parts.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l_num), Ok(r_num)) => l_num.cmp(&r_num).then_with(|| l.cmp(r)),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Sorts versions in publication order.
///
/// Releases are ordered numerically. Snapshots of base `V` are placed right
/// before release `V` in ascending timestamp/build order, with the bare
/// `V-SNAPSHOT` placeholder first. Snapshots whose release is absent keep
/// their ascending position among the other versions.
#[must_use]
pub fn sort_versions<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut versions: Vec<String> = versions.into_iter().map(Into::into).collect();
    versions.sort_by(|left, right| VersionKey::parse(left).cmp(&VersionKey::parse(right)));
    versions
}

/// Validates a version search pattern.
///
/// A pattern must either end with `-SNAPSHOT` or contain `*`, e.g. `1.*`,
/// `*`, or `1.1.1-SNAPSHOT`.
///
/// # Errors
///
/// Returns [`ArtifactError::InvalidVersionPattern`] otherwise.
pub fn validate_version_pattern(pattern: &str) -> Result<(), ArtifactError> {
    if pattern.ends_with(SNAPSHOT_SUFFIX) || pattern.contains('*') {
        Ok(())
    } else {
        Err(ArtifactError::invalid_version_pattern(pattern))
    }
}

/// Returns true if `version` matches a validated search `pattern`.
///
/// `*` matches any run of characters. A `-SNAPSHOT` pattern also matches
/// the timestamped builds sharing its base.
#[must_use]
pub fn matches_pattern(version: &str, pattern: &str) -> bool {
    if let Some(base) = pattern.strip_suffix(SNAPSHOT_SUFFIX)
        && !base.contains('*')
    {
        return version == pattern
            || version
                .split_once('-')
                .is_some_and(|(version_base, _)| version_base == base);
    }
    glob_match(version, pattern)
}

fn glob_match(text: &str, pattern: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        // No `*` at all: exact match.
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_versions_releases_numeric() {
        assert_eq!(
            sort_versions(["0.1.1", "2.23.3", "3.0"]),
            vec!["0.1.1", "2.23.3", "3.0"]
        );
        assert_eq!(
            sort_versions(["1.10.0", "1.2.0", "1.9.1"]),
            vec!["1.2.0", "1.9.1", "1.10.0"]
        );
    }

    #[test]
    fn test_sort_versions_snapshot_before_release() {
        assert_eq!(
            sort_versions(["1.0.0", "1.0.0-SNAPSHOT", "2.0.0"]),
            vec!["1.0.0-SNAPSHOT", "1.0.0", "2.0.0"]
        );
        assert_eq!(
            sort_versions(["1.0.0", "1.0.0-SNASPHOT"]),
            vec!["1.0.0-SNASPHOT", "1.0.0"]
        );
    }

    #[test]
    fn test_sort_versions_timestamped_snapshots() {
        let versions = [
            "1.0.0-SNAPSHOT",
            "4.0.0-20200206.095424-2",
            "1.0.0",
            "2.0.0-20200131.102442-1",
            "3.0.0",
            "3.1.0",
            "4.0.0-20200206.095316-1",
            "3.2.0",
            "2.0.0-20200131.102728-2",
            "3.3.0",
            "3.4.0",
            "4.0.0-20200206.095534-3",
            "4.0.0",
        ];
        assert_eq!(
            sort_versions(versions),
            vec![
                "1.0.0-SNAPSHOT",
                "1.0.0",
                "2.0.0-20200131.102442-1",
                "2.0.0-20200131.102728-2",
                "3.0.0",
                "3.1.0",
                "3.2.0",
                "3.3.0",
                "3.4.0",
                "4.0.0-20200206.095316-1",
                "4.0.0-20200206.095424-2",
                "4.0.0-20200206.095534-3",
                "4.0.0",
            ]
        );
    }

    #[test]
    fn test_sort_versions_placeholder_before_timestamped() {
        assert_eq!(
            sort_versions(["1.0.0", "1.0.0-20200131.093409-1", "1.0.0-SNAPSHOT"]),
            vec!["1.0.0-SNAPSHOT", "1.0.0-20200131.093409-1", "1.0.0"]
        );
    }

    #[test]
    fn test_sort_versions_build_numbers_numeric() {
        assert_eq!(
            sort_versions(["1.0.0-20200131.093409-10", "1.0.0-20200131.093409-9"]),
            vec!["1.0.0-20200131.093409-9", "1.0.0-20200131.093409-10"]
        );
    }

    #[test]
    fn test_sort_versions_mixed_segments_independent_of_input_order() {
        let expected = vec!["9", "10", "1a", "1b", "1b.2", "1b.x"];
        for input in [
            ["9", "10", "1a", "1b.x", "1b", "1b.2"],
            ["1a", "10", "9", "1b.2", "1b.x", "1b"],
            ["1b.x", "1b.2", "1b", "1a", "10", "9"],
        ] {
            assert_eq!(sort_versions(input), expected, "input: {input:?}");
        }
        assert_eq!(
            sort_versions(["1.0.0-rc1", "1.0.0-2", "1.0.0-10"]),
            vec!["1.0.0-2", "1.0.0-10", "1.0.0-rc1"]
        );
    }

    #[test]
    fn test_sort_versions_empty() {
        assert!(sort_versions(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_validate_version_pattern() {
        assert!(validate_version_pattern("*").is_ok());
        assert!(validate_version_pattern("1.*").is_ok());
        assert!(validate_version_pattern("1.1.1-SNAPSHOT").is_ok());
        let error = validate_version_pattern("1.0.0").unwrap_err();
        assert!(matches!(error, ArtifactError::InvalidVersionPattern { .. }));
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("1.0.0", "*"));
        assert!(matches_pattern("1.0.0", "1.*"));
        assert!(matches_pattern("1.0.0-20200131.093409-1", "1.0.*"));
        assert!(!matches_pattern("2.0.0", "1.*"));
        assert!(matches_pattern("0.3.0-SNAPSHOT", "0.3.0-SNAPSHOT"));
        assert!(matches_pattern("1.0.0-20200131.093409-1", "1.0.0-SNAPSHOT"));
        assert!(!matches_pattern("1.0.0", "1.0.0-SNAPSHOT"));
        assert!(matches_pattern("1.2.3", "1.*.3"));
        assert!(!matches_pattern("1.2.4", "1.*.3"));
    }
}
