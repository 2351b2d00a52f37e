//! Session options.

use std::time::Duration;

/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default read timeout.
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Browser-like user agent; the portal serves its regular pages to it.
const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; ymobar/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Per-request settings for a portal session.
///
/// There is no deadline across a whole multi-step flow; each request is
/// bounded by its own connect and read timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Timeout for reading a response.
    pub read_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SessionOptions {
    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
