//! Collection handles.
//!
//! Each [`Collection`] represents one named collection on the server.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Collection struct and accessors |
//! | `crud` | `all`, `get_one`, `create`, `update`, `delete` |
//! | `filter` | Query string filters for `all` |
//! | `subscription` | `subscribe`, `unsubscribe`, `watch` |
//!
//! # Example
//!
//! ```ignore
//! let users = client.collection("users");
//!
//! // CRUD
//! let created: Value = users.create(&json!({ "name": "a" })).await?;
//! let one: Value = users.get_one(1).await?;
//! let _: Value = users.update(1, &json!({ "name": "b" })).await?;
//! let _: Value = users.delete(1).await?;
//!
//! // Live changes
//! client.connect().await?;
//! let id = users.subscribe("*", |event| println!("{event:?}"))?;
//! users.unsubscribe(id);
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod crud;
mod filter;
mod subscription;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Collection;
pub use filter::Filter;
pub use subscription::EventStream;
