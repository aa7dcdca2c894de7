//! ThunderBase client: endpoint, collection registry and change channel.
//!
//! # Example
//!
//! ```no_run
//! use thunderbase::Client;
//!
//! # async fn example() -> thunderbase::Result<()> {
//! let client = Client::new("http://localhost:8080")?;
//! client.connect().await?;
//!
//! let users = client.collection("users");
//! users.subscribe("*", |event| println!("{} {}", event.event, event.record()))?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, info};
use url::Url;

use crate::collection::Collection;
use crate::error::Result;
use crate::transport::{Connection, Dispatcher, HttpTransport};

use super::builder::ClientBuilder;
use super::options::ClientOptions;

// ============================================================================
// Types
// ============================================================================

/// State shared by the client and every collection handle it creates.
pub(crate) struct ClientInner {
    /// Normalized base URL.
    pub base_url: Url,
    /// Change channel URL.
    pub ws_url: Url,
    /// Options the client was built with.
    pub options: ClientOptions,
    /// JSON-over-HTTP transport.
    pub http: HttpTransport,
    /// Routing table for change events, shared across connections.
    pub dispatcher: Arc<Dispatcher>,
    /// The current change channel, if `connect()` has succeeded.
    pub connection: RwLock<Option<Connection>>,
}

impl ClientInner {
    /// Returns `true` if the slot holds a connection whose loop is running.
    pub fn is_connected(&self) -> bool {
        self.connection
            .read()
            .as_ref()
            .is_some_and(Connection::is_open)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Entry point to a ThunderBase server.
///
/// Cloning is cheap and every clone refers to the same registry and
/// change channel.
#[derive(Clone)]
pub struct Client {
    /// Shared inner state.
    pub(crate) inner: Arc<ClientInner>,
    /// Collection handles by name.
    collections: Arc<Mutex<FxHashMap<String, Collection>>>,
}

// ============================================================================
// Client - Display
// ============================================================================

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("connected", &self.is_connected())
            .field("collections", &self.collection_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Creates a client for `base_url` with default options.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) if `base_url` is not an
    /// absolute URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().base_url(base_url).build()
    }

    /// Creates a configuration builder for the client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Assembles a client from validated parts.
    pub(crate) fn from_parts(
        base_url: Url,
        ws_url: Url,
        options: ClientOptions,
        http: HttpTransport,
    ) -> Self {
        debug!(base_url = %base_url, ws_url = %ws_url, "Client created");

        Self {
            inner: Arc::new(ClientInner {
                base_url,
                ws_url,
                options,
                http,
                dispatcher: Arc::new(Dispatcher::new()),
                connection: RwLock::new(None),
            }),
            collections: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the change channel URL.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> &Url {
        &self.inner.ws_url
    }

    /// Returns the options the client was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Returns the total number of live subscriptions across collections.
    #[inline]
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.dispatcher.subscriber_count()
    }
}

// ============================================================================
// Client - Collections
// ============================================================================

impl Client {
    /// Returns the handle for collection `name`, creating it on first use.
    ///
    /// Every call with the same name returns the same handle; see
    /// [`Collection::ptr_eq`].
    pub fn collection(&self, name: &str) -> Collection {
        let mut collections = self.collections.lock();

        if let Some(collection) = collections.get(name) {
            return collection.clone();
        }

        let collection = Collection::new(Arc::clone(&self.inner), name);
        collections.insert(name.to_string(), collection.clone());
        debug!(collection = name, "Collection handle created");
        collection
    }

    /// Returns the number of collection handles created so far.
    #[inline]
    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.collections.lock().len()
    }
}

// ============================================================================
// Client - Connection Lifecycle
// ============================================================================

impl Client {
    /// Opens the shared change channel at `{base}/ws`.
    ///
    /// Resolves once the WebSocket handshake completes. Only then does the
    /// connection become visible to `subscribe`.
    ///
    /// Calling this again replaces the channel: the new connection is opened
    /// first, then the previous one is closed. Existing subscriptions carry
    /// over to the new channel.
    ///
    /// # Errors
    ///
    /// - [`Error::WebSocket`](crate::Error::WebSocket) if the connection or
    ///   upgrade fails
    /// - [`Error::ConnectionTimeout`](crate::Error::ConnectionTimeout) if the
    ///   handshake exceeds the configured connect timeout
    pub async fn connect(&self) -> Result<()> {
        let connection = Connection::open(
            &self.inner.ws_url,
            self.inner.options.connect_timeout,
            Arc::clone(&self.inner.dispatcher),
        )
        .await?;

        let previous = self.inner.connection.write().replace(connection);

        if let Some(previous) = previous {
            previous.shutdown();
            debug!("Previous connection replaced");
        }

        info!(url = %self.inner.ws_url, "Client connected");
        Ok(())
    }

    /// Closes the change channel.
    ///
    /// Subscriptions stay registered and resume after the next `connect()`.
    /// Returns `false` if there was no channel.
    pub fn disconnect(&self) -> bool {
        let previous = self.inner.connection.write().take();

        match previous {
            Some(connection) => {
                connection.shutdown();
                info!(url = %self.inner.ws_url, "Client disconnected");
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the change channel is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }
}

// ============================================================================
// Tests
// ============================================================================
