//! Error types for the ThunderBase client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use thunderbase::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     let users = client.collection("users");
//!     let created: serde_json::Value = users.create(&serde_json::json!({ "name": "a" })).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Usage | [`Error::NotConnected`], [`Error::Config`] |
//! | Transport | [`Error::Http`], [`Error::WebSocket`], [`Error::ConnectionTimeout`] |
//! | Decode | [`Error::Json`] |
//! | Application | [`Error::Status`] (only with `error_for_status` enabled) |
//!
//! A server-side failure reported through a normal JSON body is not an error
//! by default: the decoded body is returned as-is and the caller inspects it.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use reqwest::StatusCode;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid, including a base URL
    /// that cannot be parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// No live change channel.
    ///
    /// Returned synchronously by `subscribe` and `watch` when
    /// [`Client::connect`](crate::Client::connect) has not completed, or the
    /// channel has since closed.
    #[error("WebSocket connection not established. Call connect() first.")]
    NotConnected,

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The WebSocket handshake did not finish in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// HTTP request failed before a response body was read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // Decode Errors
    // ========================================================================
    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Application Errors
    // ========================================================================
    /// Non-2xx HTTP status.
    ///
    /// Only produced when the client is built with
    /// [`ClientBuilder::error_for_status`](crate::ClientBuilder::error_for_status).
    #[error("HTTP status {status}: {body}")]
    Status {
        /// Response status code.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a status error from a response status and body.
    #[inline]
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error comes from calling the API incorrectly.
    #[inline]
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Config { .. })
    }

    /// Returns `true` if this is a network-level failure.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::WebSocket(_) | Self::ConnectionTimeout { .. }
        )
    }

    /// Returns `true` if a payload could not be decoded.
    #[inline]
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Returns `true` if this concerns the change channel rather than a
    /// CRUD request.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::WebSocket(_) | Self::NotConnected
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::ConnectionTimeout { .. } => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
