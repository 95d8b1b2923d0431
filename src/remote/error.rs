//! Error types for remote storage operations.

use thiserror::Error;

/// Errors returned by a [`Remote`](super::Remote).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// The URL that does not exist.
        url: String,
    },

    /// The server refused access (401 or 403).
    #[error(
        "access denied (HTTP {status}) for {url}\n  Suggestion: Check that your credentials have access rights for this path"
    )]
    Forbidden {
        /// The URL that was refused.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Any other non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// The URL that failed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Network-level failure (DNS, connection refused, TLS, broken stream).
    #[error("network error for {url}: {source}")]
    Network {
        /// The URL being accessed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request did not complete within the configured timeout.
    #[error("timeout accessing {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The URL is malformed or outside the configured server root.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The server answered with a body this client cannot interpret.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse {
        /// The URL that was requested.
        url: String,
        /// What was wrong with the response.
        reason: String,
    },
}

impl RemoteError {
    /// Creates a not-found error.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Creates an access-denied error.
    pub fn forbidden(url: impl Into<String>, status: u16) -> Self {
        Self::Forbidden {
            url: url.into(),
            status,
        }
    }

    /// Maps a non-success status code to the matching variant.
    pub fn from_status(url: impl Into<String>, status: u16) -> Self {
        match status {
            404 => Self::not_found(url),
            401 | 403 => Self::forbidden(url, status),
            _ => Self::Status {
                url: url.into(),
                status,
            },
        }
    }

    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for [`RemoteError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_codes() {
        assert!(RemoteError::from_status("u", 404).is_not_found());
        assert!(matches!(
            RemoteError::from_status("u", 403),
            RemoteError::Forbidden { status: 403, .. }
        ));
        assert!(matches!(
            RemoteError::from_status("u", 401),
            RemoteError::Forbidden { status: 401, .. }
        ));
        assert!(matches!(
            RemoteError::from_status("u", 500),
            RemoteError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_forbidden_message_mentions_access_rights() {
        let msg = RemoteError::forbidden("https://host/repo/a.pom", 403).to_string();
        assert!(msg.contains("403"), "got: {msg}");
        assert!(msg.contains("access rights"), "got: {msg}");
        assert!(msg.contains("https://host/repo/a.pom"), "got: {msg}");
    }

    #[test]
    fn test_not_found_message_names_url() {
        let msg = RemoteError::not_found("https://host/repo/missing.pom").to_string();
        assert!(msg.contains("https://host/repo/missing.pom"), "got: {msg}");
    }
}
