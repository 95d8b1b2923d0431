//! User-Agent string for repository HTTP traffic.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/audeering/audfactory";

/// Default User-Agent for repository requests (identifies the client).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("artifactory-client/{version} (+{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_version_and_url() {
        let ua = default_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("artifactory-client/")
                .and_then(|s| s.split(' ').next()),
            "UA must contain crate version"
        );
    }
}
