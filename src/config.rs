//! Configuration for the background-removal service client
//!
//! The service endpoint and credential are both injected: a
//! [`RemovalServiceConfig`] built through a validating builder carries the
//! base URL and polling budget, and an [`ApiKeyProvider`] resolves the
//! credential at call time so no secret lives in client-reachable constants.

use crate::error::{MockproofError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait between task-status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default cap on consecutive "processing" responses before giving up
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Default per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of the `X-API-Key` credential sent with every service request.
///
/// Implementations resolve the key when asked, never at construction, so a
/// host can rotate a session token handed down from its trusted backend
/// without rebuilding the client.
pub trait ApiKeyProvider: Send + Sync {
    /// Resolve the current API key
    ///
    /// # Errors
    /// - [`MockproofError::MissingCredential`] when no key is available
    fn api_key(&self) -> Result<String>;
}

/// Provider backed by an already-resolved token (tests, or hosts that fetched
/// a session credential from their own backend)
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: String,
}

impl StaticKeyProvider {
    /// Wrap an already-resolved credential
    #[must_use]
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self { key: key.into() }
    }
}

impl ApiKeyProvider for StaticKeyProvider {
    fn api_key(&self) -> Result<String> {
        if self.key.is_empty() {
            return Err(MockproofError::missing_credential(
                "static API key is empty",
            ));
        }
        Ok(self.key.clone())
    }
}

/// Provider that reads the credential from an environment variable at call time
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var_name: String,
}

impl EnvKeyProvider {
    /// Resolve the key from `var_name` on each request
    #[must_use]
    pub fn new<S: Into<String>>(var_name: S) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

impl ApiKeyProvider for EnvKeyProvider {
    fn api_key(&self) -> Result<String> {
        match std::env::var(&self.var_name) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(MockproofError::missing_credential(format!(
                "environment variable {} is unset or empty",
                self.var_name
            ))),
        }
    }
}

/// Configuration for the background-removal service client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalServiceConfig {
    /// Base URL of the removal service (no trailing slash)
    pub service_base_url: String,

    /// Wait between task-status polls
    pub poll_interval: Duration,

    /// Cap on consecutive "processing" responses before the attempt times out
    pub max_poll_attempts: u32,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for RemovalServiceConfig {
    fn default() -> Self {
        Self {
            service_base_url: String::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RemovalServiceConfig {
    /// Create a new configuration builder for fluent construction
    #[must_use]
    pub fn builder() -> RemovalServiceConfigBuilder {
        RemovalServiceConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Empty or non-HTTP base URL
    /// - Zero poll interval or zero attempt budget
    pub fn validate(&self) -> Result<()> {
        if self.service_base_url.is_empty() {
            return Err(MockproofError::invalid_config(
                "service_base_url must not be empty",
            ));
        }
        if !self.service_base_url.starts_with("http://")
            && !self.service_base_url.starts_with("https://")
        {
            return Err(MockproofError::invalid_config(format!(
                "service_base_url must be an http(s) URL, got: {}",
                self.service_base_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(MockproofError::config_value_error(
                "poll_interval",
                "0ms",
                "> 0",
            ));
        }
        if self.max_poll_attempts == 0 {
            return Err(MockproofError::config_value_error(
                "max_poll_attempts",
                self.max_poll_attempts,
                ">= 1",
            ));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.service_base_url.trim_end_matches('/')
    }
}

/// Builder for [`RemovalServiceConfig`]
#[derive(Debug, Default)]
pub struct RemovalServiceConfigBuilder {
    config: RemovalServiceConfig,
}

impl RemovalServiceConfigBuilder {
    /// Set the service base URL
    #[must_use]
    pub fn service_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.service_base_url = url.into();
        self
    }

    /// Set the wait between task-status polls
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the cap on consecutive "processing" polls
    #[must_use]
    pub fn max_poll_attempts(mut self, attempts: u32) -> Self {
        self.config.max_poll_attempts = attempts;
        self
    }

    /// Set the per-request HTTP timeout
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the configuration, validating all parameters
    ///
    /// # Errors
    /// - Any validation failure from [`RemovalServiceConfig::validate`]
    pub fn build(self) -> Result<RemovalServiceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
