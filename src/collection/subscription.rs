//! Change subscriptions on a collection.
//!
//! Subscriptions are registered with the client's dispatcher, which decodes
//! each frame from the shared channel once and routes it by collection name
//! and event. A handle only removes subscriptions it created.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;
use crate::protocol::{ChangeEvent, EventSelector};

use super::Collection;

// ============================================================================
// Collection - Subscriptions
// ============================================================================

impl Collection {
    /// Calls `callback` for every change event on this collection matching
    /// `event` (`"*"` for all events).
    ///
    /// The callback receives the whole decoded frame, runs on the
    /// connection's event loop task, and must not block.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] if the client has no open change channel.
    /// Nothing is registered in that case.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use thunderbase::Client;
    /// # async fn example() -> thunderbase::Result<()> {
    /// let client = Client::new("http://localhost:8080")?;
    /// client.connect().await?;
    ///
    /// let users = client.collection("users");
    /// let id = users.subscribe("INSERT", |event| {
    ///     println!("new user: {}", event.record());
    /// })?;
    ///
    /// users.unsubscribe(id);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<F>(
        &self,
        event: impl Into<EventSelector>,
        callback: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        if !self.inner.client.is_connected() {
            return Err(Error::NotConnected);
        }

        let selector = event.into();
        let mut subscriptions = self.inner.subscriptions.lock();

        let id = self.inner.client.dispatcher.register(
            &self.inner.name,
            selector.clone(),
            Arc::new(callback),
        );
        subscriptions.insert(id);

        debug!(collection = %self.inner.name, event = %selector, %id, "Subscribed");
        Ok(id)
    }

    /// Returns a stream of change events on this collection matching `event`.
    ///
    /// Dropping the stream removes the subscription.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] if the client has no open change channel.
    pub fn watch(&self, event: impl Into<EventSelector>) -> Result<EventStream> {
        let (tx, rx) = mpsc::unbounded_channel();

        let id = self.subscribe(event, move |change: &ChangeEvent| {
            if tx.send(change.clone()).is_err() {
                trace!("Event stream receiver dropped");
            }
        })?;

        Ok(EventStream {
            id,
            collection: self.clone(),
            rx,
        })
    }

    /// Removes a subscription created through this handle.
    ///
    /// Returns `false`, and does nothing, if `id` is unknown, already
    /// removed, or belongs to another collection.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.inner.subscriptions.lock();

        if !subscriptions.remove(&id) {
            return false;
        }

        let removed = self.inner.client.dispatcher.unregister(id);
        debug!(collection = %self.inner.name, %id, "Unsubscribed");
        removed
    }

    /// Removes every subscription created through this handle.
    ///
    /// Returns the number removed.
    pub fn unsubscribe_all(&self) -> usize {
        let ids: Vec<_> = self.inner.subscriptions.lock().drain().collect();

        let removed = ids
            .into_iter()
            .filter(|id| self.inner.client.dispatcher.unregister(*id))
            .count();

        if removed > 0 {
            debug!(collection = %self.inner.name, removed, "Removed all subscriptions");
        }
        removed
    }

    /// Returns the number of live subscriptions created through this handle.
    #[inline]
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.lock().len()
    }
}

// ============================================================================
// EventStream
// ============================================================================

/// Stream of change events returned by [`Collection::watch`].
///
/// Also usable without `StreamExt` through [`next`](Self::next).
pub struct EventStream {
    id: SubscriptionId,
    collection: Collection,
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("id", &self.id)
            .field("collection", &self.collection.name())
            .finish_non_exhaustive()
    }
}

impl EventStream {
    /// Returns the subscription ID backing this stream.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next change event.
    ///
    /// Returns `None` once the subscription has been removed and buffered
    /// events are drained.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Returns a buffered event without waiting.
    #[inline]
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

impl Stream for EventStream {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.collection.unsubscribe(self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
