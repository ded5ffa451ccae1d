use std::time::Duration;

/// Default API location.
pub const DEFAULT_BASE_URL: &str = "https://api.thapardronechallenge.in/api/";

/// Configuration for the TDC client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Background refetch interval for list queries, in seconds.
    pub poll_interval_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            poll_interval_secs: 15,
            user_agent: format!("tdc-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TDC_API_URL`, `TDC_TIMEOUT_SECS` and `TDC_POLL_INTERVAL_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("TDC_API_URL") {
            config.base_url = url;
        }
        if let Some(secs) = std::env::var("TDC_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()) {
            config.timeout_secs = secs;
        }
        if let Some(secs) =
            std::env::var("TDC_POLL_INTERVAL_SECS").ok().and_then(|s| s.parse().ok())
        {
            config.poll_interval_secs = secs;
        }
        config
    }

    /// Point the client at another server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Poll interval; never zero.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}
