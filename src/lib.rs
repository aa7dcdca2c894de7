//! ThunderBase client SDK.
//!
//! This library exposes a ThunderBase server's collections through REST
//! calls for CRUD and a single shared WebSocket for change notifications.
//!
//! # Architecture
//!
//! - A [`Client`] owns the base URL, one [`Collection`] handle per name,
//!   and at most one live change channel at `{base}/ws`
//! - CRUD calls are plain HTTP requests and do not need the channel
//! - The server pushes every row change of every collection over the
//!   channel; the client decodes each frame once and routes it to the
//!   subscriptions whose collection and event match
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::{Value, json};
//! use thunderbase::{Client, Filter, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new("http://localhost:8080")?;
//!     let users = client.collection("users");
//!
//!     // CRUD over HTTP
//!     let created: Value = users.create(&json!({ "name": "a" })).await?;
//!     let all: Value = users.all(&Filter::new()).await?;
//!     println!("created {created}, now {all}");
//!
//!     // Live changes over WebSocket
//!     client.connect().await?;
//!     let id = users.subscribe("*", |event| {
//!         println!("{} on {}: {}", event.event, event.collection, event.record());
//!     })?;
//!
//!     users.unsubscribe(id);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`], builder and options |
//! | [`collection`] | [`Collection`] CRUD and subscriptions |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Subscription tokens |
//! | [`protocol`] | Change event types |
//! | [`transport`] | HTTP, WebSocket and dispatch (internal) |
//!
//! # Behavior Notes
//!
//! - CRUD calls resolve with the decoded body regardless of HTTP status,
//!   unless [`ClientBuilder::error_for_status`] is enabled
//! - `subscribe` before a successful `connect()` fails immediately with
//!   [`Error::NotConnected`]
//! - There is no automatic reconnection; call `connect()` again and existing
//!   subscriptions resume on the new channel

// ============================================================================
// Modules
// ============================================================================

/// Client entry point and configuration.
///
/// Use [`Client::new`] or [`Client::builder()`] to create a client.
pub mod client;

/// Collection handles: CRUD and change subscriptions.
pub mod collection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// WebSocket message types.
pub mod protocol;

/// HTTP and WebSocket transport layer.
///
/// Internal module handling requests, the change channel and event routing.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder, ClientOptions};

// Collection types
pub use collection::{Collection, EventStream, Filter};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::SubscriptionId;

// Protocol types
pub use protocol::{ChangeEvent, EventSelector};
