//! Transport layer.
//!
//! Two independent channels connect the client to the server:
//!
//! ```text
//! ┌──────────────────┐        HTTP (CRUD)         ┌──────────────────┐
//! │  Collection      │───────────────────────────►│                  │
//! │  (HttpTransport) │◄───────────────────────────│   ThunderBase    │
//! │                  │                            │   server         │
//! │  Client          │     WebSocket {base}/ws    │                  │
//! │  (Connection) ◄──┼────────────────────────────│                  │
//! │      │           │    change frames (push)    └──────────────────┘
//! │      ▼           │
//! │  Dispatcher ──► subscriber callbacks
//! └──────────────────┘
//! ```
//!
//! There is no causal ordering between a CRUD response and the change
//! frame it produces.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `dispatcher` | Routing table from change events to callbacks |
//! | `http` | JSON request/response over HTTP |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Change event routing.
pub mod dispatcher;

/// HTTP transport for CRUD calls.
pub mod http;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use dispatcher::{Dispatcher, EventCallback};
pub use http::HttpTransport;
