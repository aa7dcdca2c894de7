//! Client factory and configuration.
//!
//! This module provides the [`Client`], its [`ClientBuilder`] and the
//! [`ClientOptions`] value type.
//!
//! # Example
//!
//! ```no_run
//! use thunderbase::Client;
//!
//! # async fn example() -> thunderbase::Result<()> {
//! let client = Client::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! client.connect().await?;
//! let users = client.collection("users");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

/// Client options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::Client;
pub use options::{ClientOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WS_PATH};
