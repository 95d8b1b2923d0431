//! Explicit client configuration.
//!
//! Every entry point takes a [`RepositoryConfig`] instead of reading
//! process-wide state. [`RepositoryConfig::default`] carries the documented
//! defaults and [`RepositoryConfig::from_env`] layers environment overrides
//! on top of them.

use std::env;

use thiserror::Error;

/// Default server root (everything before the repository segment).
pub const DEFAULT_ROOT: &str = "https://artifactory.audeering.com/artifactory";

/// Default repository used for artifacts and POMs.
pub const DEFAULT_REPOSITORY: &str = "maven";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large artifacts).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default bound on transitive dependency recursion.
pub const MAX_DEPENDENCY_DEPTH: usize = 64;

const ENV_ROOT: &str = "ARTIFACTORY_ROOT";
const ENV_REPOSITORY: &str = "ARTIFACTORY_REPOSITORY";
const ENV_USERNAME: &str = "ARTIFACTORY_USERNAME";
const ENV_API_KEY: &str = "ARTIFACTORY_API_KEY";

/// Errors raised while validating a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration value is outside its accepted range or shape.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Basic-auth credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub username: String,
    /// API key or password.
    pub api_key: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }
}

// Keep the key out of logs and debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Server location and client behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Server root URL, without trailing slash.
    pub root: String,
    /// Repository for artifacts, POMs and version searches.
    pub repository: String,
    /// Optional basic-auth credentials.
    pub credentials: Option<Credentials>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// Maximum nesting of transitive dependency resolution.
    pub max_dependency_depth: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            credentials: None,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            max_dependency_depth: MAX_DEPENDENCY_DEPTH,
        }
    }
}

impl RepositoryConfig {
    /// Creates a configuration for `root` and `repository` with default
    /// timeouts and no credentials.
    #[must_use]
    pub fn new(root: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            root: root.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
            ..Self::default()
        }
    }

    /// Builds the default configuration with environment overrides applied.
    ///
    /// Reads `ARTIFACTORY_ROOT`, `ARTIFACTORY_REPOSITORY`, and the
    /// `ARTIFACTORY_USERNAME` / `ARTIFACTORY_API_KEY` pair. Credentials are
    /// only set when both variables are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(root) = env_value(ENV_ROOT) {
            config.root = root.trim_end_matches('/').to_string();
        }
        if let Some(repository) = env_value(ENV_REPOSITORY) {
            config.repository = repository;
        }
        if let (Some(username), Some(api_key)) = (env_value(ENV_USERNAME), env_value(ENV_API_KEY))
        {
            config.credentials = Some(Credentials::new(username, api_key));
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Validates value ranges and URL shape.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.root)
            .map_err(|error| ConfigError::invalid("root", format!("{}: {error}", self.root)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "root",
                format!("{} must use http or https", self.root),
            ));
        }
        if self.root.ends_with('/') {
            return Err(ConfigError::invalid(
                "root",
                format!("{} must not end with '/'", self.root),
            ));
        }
        if self.repository.is_empty() || self.repository.contains('/') {
            return Err(ConfigError::invalid(
                "repository",
                format!("'{}' must be a single non-empty path segment", self.repository),
            ));
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if self.max_dependency_depth == 0 {
            return Err(ConfigError::invalid(
                "max_dependency_depth",
                "expected at least 1",
            ));
        }
        Ok(())
    }

    /// `root/repository`, the prefix of every artifact URL in this repository.
    #[must_use]
    pub fn repository_url(&self) -> String {
        format!("{}/{}", self.root, self.repository)
    }
}

fn validate_timeout_secs(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(1..=3600).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value}. Expected range: 1..=3600"),
        ));
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
