//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use thunderbase::Client;
//!
//! # fn example() -> thunderbase::Result<()> {
//! let client = Client::builder()
//!     .base_url("http://localhost:8080")
//!     .request_timeout(Duration::from_secs(10))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::transport::HttpTransport;

use super::core::Client;
use super::options::ClientOptions;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Server base URL.
    base_url: Option<String>,
    /// Client options.
    options: ClientOptions,
    /// Caller-supplied HTTP client.
    http_client: Option<reqwest::Client>,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new client builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server base URL (e.g. `http://localhost:8080`).
    ///
    /// Collections live at `{base}/{name}` and the change channel at
    /// `{base}/ws`.
    #[inline]
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the per-request timeout for CRUD calls.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_request_timeout(timeout);
        self
    }

    /// Sets the WebSocket handshake timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_connect_timeout(timeout);
        self
    }

    /// Sets the change channel path (default `/ws`).
    #[inline]
    #[must_use]
    pub fn ws_path(mut self, path: impl Into<String>) -> Self {
        self.options = self.options.with_ws_path(path);
        self
    }

    /// Turns non-2xx CRUD responses into [`Error::Status`].
    ///
    /// Off by default: error bodies are decoded and returned like any other
    /// response.
    #[inline]
    #[must_use]
    pub fn error_for_status(mut self, enabled: bool) -> Self {
        self.options.error_for_status = enabled;
        self
    }

    /// Sets the `User-Agent` header for CRUD requests.
    #[inline]
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options = self.options.with_user_agent(user_agent);
        self
    }

    /// Uses an existing HTTP client.
    ///
    /// `request_timeout` and `user_agent` are not applied to a supplied
    /// client; configure them on it directly.
    #[inline]
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the base URL is missing or not an absolute
    ///   `http`, `https`, `ws` or `wss` URL
    /// - [`Error::Http`] if the HTTP client cannot be constructed
    pub fn build(self) -> Result<Client> {
        let base_url = self.validate_base_url()?;
        let ws_url = ws_url_for(&base_url, &self.options.ws_path)?;
        let http = HttpTransport::new(self.build_http_client()?, self.options.error_for_status);

        Ok(Client::from_parts(base_url, ws_url, self.options, http))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Parses and normalizes the base URL.
    fn validate_base_url(&self) -> Result<Url> {
        let raw = self.base_url.as_deref().ok_or_else(|| {
            Error::config(
                "Base URL is required. Use .base_url() to set it.\n\
                 Example: Client::builder().base_url(\"http://localhost:8080\")",
            )
        })?;

        let mut url = Url::parse(raw)
            .map_err(|e| Error::config(format!("Invalid base URL '{raw}': {e}")))?;

        if url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Base URL '{raw}' cannot carry a path"
            )));
        }

        match url.scheme() {
            "http" | "https" | "ws" | "wss" => {}
            other => {
                return Err(Error::config(format!(
                    "Unsupported base URL scheme '{other}'"
                )));
            }
        }

        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// Builds the HTTP client from options unless one was supplied.
    fn build_http_client(&self) -> Result<reqwest::Client> {
        if let Some(client) = &self.http_client {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &self.options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(builder.build()?)
    }
}

// ============================================================================
// URL Helpers
// ============================================================================

/// Appends path segments to `base`, ignoring a trailing slash on `base`.
pub(crate) fn join_segments<'a, I>(base: &Url, segments: I) -> Result<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::config(format!("Base URL '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Derives the change channel URL: `http` becomes `ws`, `https` becomes `wss`.
fn ws_url_for(base: &Url, ws_path: &str) -> Result<Url> {
    let mut url = join_segments(base, ws_path.split('/').filter(|s| !s.is_empty()))?;

    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::config(format!(
                "Unsupported base URL scheme '{other}'"
            )));
        }
    };

    url.set_scheme(scheme)
        .map_err(|()| Error::config(format!("Cannot derive WebSocket URL from '{base}'")))?;
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
