//! WebSocket message types.
//!
//! The change channel is one-way: the server pushes a frame for every row
//! change in every collection, and the client filters locally.
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `ChangeEvent` | Remote → Local | Row change notification |
//!
//! [`EventSelector`] picks which events of a collection a subscription sees.

// ============================================================================
// Submodules
// ============================================================================

/// Change notification and selector types.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{ChangeEvent, EventSelector};
