//! Client configuration options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use thunderbase::ClientOptions;
//!
//! let options = ClientOptions::new()
//!     .with_request_timeout(Duration::from_secs(10))
//!     .with_error_for_status();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default path of the change channel, relative to the base URL.
pub const DEFAULT_WS_PATH: &str = "/ws";

// ============================================================================
// ClientOptions
// ============================================================================

/// Tunables for a [`Client`](crate::Client).
///
/// The defaults reproduce the plain behavior of the REST API: no request
/// timeout and status codes passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Timeout for each CRUD request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,

    /// Timeout for the WebSocket handshake in `connect()`.
    pub connect_timeout: Duration,

    /// Path of the change channel, appended to the base URL.
    pub ws_path: String,

    /// Turn non-2xx responses into [`Error::Status`](crate::Error::Status).
    pub error_for_status: bool,

    /// `User-Agent` header for CRUD requests.
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ws_path: DEFAULT_WS_PATH.to_string(),
            error_for_status: false,
            user_agent: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Sets the per-request timeout.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the WebSocket handshake timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the change channel path.
    #[inline]
    #[must_use]
    pub fn with_ws_path(mut self, path: impl Into<String>) -> Self {
        self.ws_path = path.into();
        self
    }

    /// Enables status checking on CRUD responses.
    #[inline]
    #[must_use]
    pub fn with_error_for_status(mut self) -> Self {
        self.error_for_status = true;
        self
    }

    /// Sets the `User-Agent` header.
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.request_timeout, None);
        assert_eq!(options.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(options.ws_path, "/ws");
        assert!(!options.error_for_status);
        assert!(options.user_agent.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = ClientOptions::new()
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(2))
            .with_ws_path("/realtime")
            .with_error_for_status()
            .with_user_agent("demo/1.0");

        assert_eq!(options.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.connect_timeout, Duration::from_secs(2));
        assert_eq!(options.ws_path, "/realtime");
        assert!(options.error_for_status);
        assert_eq!(options.user_agent.as_deref(), Some("demo/1.0"));
    }
}
