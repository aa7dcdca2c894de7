//! Collection handle struct and accessors.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use url::Url;

use crate::client::builder::join_segments;
use crate::client::core::ClientInner;
use crate::error::Result;
use crate::identifiers::SubscriptionId;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a collection handle.
pub(crate) struct CollectionInner {
    /// Owning client's shared state.
    pub client: Arc<ClientInner>,
    /// Collection name.
    pub name: String,
    /// Subscriptions registered through this handle.
    pub subscriptions: Mutex<FxHashSet<SubscriptionId>>,
}

// ============================================================================
// Collection
// ============================================================================

/// Handle to one named collection on the server.
///
/// Obtained from [`Client::collection`](crate::Client::collection); the
/// client hands out the same handle for the same name. CRUD calls go over
/// HTTP and are independent of the change channel.
///
/// # Example
///
/// ```no_run
/// # use thunderbase::{Client, Filter};
/// # use serde_json::{json, Value};
/// # async fn example() -> thunderbase::Result<()> {
/// let client = Client::new("http://localhost:8080")?;
/// let users = client.collection("users");
///
/// let created: Value = users.create(&json!({ "name": "a" })).await?;
/// let listed: Value = users.all(&Filter::new().with("name", "a")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Collection {
    /// Shared inner state.
    pub(crate) inner: Arc<CollectionInner>,
}

// ============================================================================
// Collection - Display
// ============================================================================

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("subscriptions", &self.subscription_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Collection - Constructor
// ============================================================================

impl Collection {
    /// Creates a new collection handle.
    pub(crate) fn new(client: Arc<ClientInner>, name: &str) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                client,
                name: name.to_string(),
                subscriptions: Mutex::new(FxHashSet::default()),
            }),
        }
    }
}

// ============================================================================
// Collection - Accessors
// ============================================================================

impl Collection {
    /// Returns the collection name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns `true` if both values are the same handle.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns `{base}/{name}`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) if the base URL cannot carry
    /// a path.
    pub fn url(&self) -> Result<Url> {
        join_segments(&self.inner.client.base_url, [self.name()])
    }

    /// Returns `{base}/{name}/{id}`.
    pub(crate) fn record_url(&self, id: &str) -> Result<Url> {
        join_segments(&self.inner.client.base_url, [self.name(), id])
    }
}

// ============================================================================
// Tests
// ============================================================================
