//! Client configuration types.

use std::collections::HashMap;
use std::time::Duration;

use reel_core::{Error, Result};
use url::Url;

/// Default read API endpoint (library queries over GET).
pub const DEFAULT_READ_URL: &str = "https://api.reel.media/services/library";

/// Default write API endpoint (media posts and uploads).
pub const DEFAULT_WRITE_URL: &str = "https://api.reel.media/services/post";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

/// Configuration for the media API surface: endpoints, default headers, and
/// an optional per-client deadline.
///
/// Per-instance state, never process-global: concurrent clients with
/// different configurations stay independent.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Read API endpoint (GET commands).
    pub read_url: Url,
    /// Write API endpoint (POST commands and uploads).
    pub write_url: Url,
    /// Headers sent with every request.
    pub headers: HashMap<String, String>,
    /// Optional deadline applied to each API call, uploads included.
    pub timeout: Option<Duration>,
}

impl MediaConfig {
    /// Configuration pointing at the production endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either default URL fails to parse (it cannot).
    pub fn new() -> Result<Self> {
        Self::with_endpoints(DEFAULT_READ_URL, DEFAULT_WRITE_URL)
    }

    /// Configuration with explicit read/write endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL cannot be parsed.
    pub fn with_endpoints(read_url: impl AsRef<str>, write_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            read_url: Url::parse(read_url.as_ref()).map_err(Error::InvalidUrl)?,
            write_url: Url::parse(write_url.as_ref()).map_err(Error::InvalidUrl)?,
            headers: HashMap::new(),
            timeout: None,
        })
    }
}
