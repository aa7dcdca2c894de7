//! Central routing of change events to subscribers.
//!
//! One [`Dispatcher`] is owned by each client and shared by every
//! collection handle and every connection that client opens. Each inbound
//! frame is decoded once and then routed through a table keyed by
//! collection name and event selector.
//!
//! # Routing Table
//!
//! ```text
//! "users" ─┬─ any:   [sub-1, sub-4]
//!          └─ named: "INSERT" → [sub-2]
//!                    "DELETE" → [sub-3]
//! "posts" ─── any:   [sub-5]
//! ```
//!
//! A frame `{collection: "users", event: "INSERT"}` reaches sub-1, sub-2
//! and sub-4, in that order.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::error::Result;
use crate::identifiers::SubscriptionId;
use crate::protocol::{ChangeEvent, EventSelector};

// ============================================================================
// Types
// ============================================================================

/// Callback invoked for every matching change event.
pub type EventCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// A registered subscriber.
struct Subscriber {
    collection: String,
    selector: EventSelector,
    callback: EventCallback,
}

/// Subscription IDs for one collection.
///
/// Every list is kept in ascending ID order, which is registration order.
#[derive(Default)]
struct CollectionRoutes {
    /// Wildcard subscriptions.
    any: Vec<SubscriptionId>,
    /// Subscriptions for one event name.
    named: FxHashMap<String, Vec<SubscriptionId>>,
}

impl CollectionRoutes {
    fn is_empty(&self) -> bool {
        self.any.is_empty() && self.named.is_empty()
    }
}

#[derive(Default)]
struct RoutingTable {
    routes: FxHashMap<String, CollectionRoutes>,
    subscribers: FxHashMap<SubscriptionId, Subscriber>,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes decoded change events to registered callbacks.
///
/// Registration and removal never block on I/O. Callbacks run on the
/// connection's event loop task, outside the table lock, so a callback may
/// itself subscribe or unsubscribe.
#[derive(Default)]
pub struct Dispatcher {
    table: RwLock<RoutingTable>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Dispatcher - Registration
// ============================================================================

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for `(collection, selector)`.
    ///
    /// Returns the token that removes this registration.
    pub fn register(
        &self,
        collection: &str,
        selector: EventSelector,
        callback: EventCallback,
    ) -> SubscriptionId {
        let mut table = self.table.write();

        // Allocated under the write lock so route lists stay sorted.
        let id = SubscriptionId::next();

        let routes = table.routes.entry(collection.to_string()).or_default();
        match &selector {
            EventSelector::Any => routes.any.push(id),
            EventSelector::Named(name) => routes.named.entry(name.clone()).or_default().push(id),
        }

        table.subscribers.insert(
            id,
            Subscriber {
                collection: collection.to_string(),
                selector,
                callback,
            },
        );

        trace!(%id, collection, "Subscriber registered");
        id
    }

    /// Removes a registration.
    ///
    /// Returns `false` if `id` is not registered.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let mut table = self.table.write();

        let Some(subscriber) = table.subscribers.remove(&id) else {
            return false;
        };

        if let Some(routes) = table.routes.get_mut(&subscriber.collection) {
            match &subscriber.selector {
                EventSelector::Any => routes.any.retain(|s| *s != id),
                EventSelector::Named(name) => {
                    if let Some(ids) = routes.named.get_mut(name) {
                        ids.retain(|s| *s != id);
                        if ids.is_empty() {
                            routes.named.remove(name);
                        }
                    }
                }
            }

            if routes.is_empty() {
                table.routes.remove(&subscriber.collection);
            }
        }

        trace!(%id, collection = %subscriber.collection, "Subscriber removed");
        true
    }

    /// Returns `true` if `id` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.table.read().subscribers.contains_key(&id)
    }

    /// Returns the total number of registrations.
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.table.read().subscribers.len()
    }
}

// ============================================================================
// Dispatcher - Routing
// ============================================================================

impl Dispatcher {
    /// Decodes one inbound text frame and dispatches it.
    ///
    /// Returns the number of callbacks invoked.
    ///
    /// # Errors
    ///
    /// [`Error::Json`](crate::Error::Json) if the frame is not a change
    /// event. No callback is invoked in that case.
    pub fn dispatch_frame(&self, text: &str) -> Result<usize> {
        let event = ChangeEvent::from_frame(text)?;
        Ok(self.dispatch(&event))
    }

    /// Invokes every callback whose collection and selector match `event`,
    /// in registration order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &ChangeEvent) -> usize {
        let callbacks = self.matching(&event.collection, &event.event);

        trace!(
            collection = %event.collection,
            event = %event.event,
            matched = callbacks.len(),
            "Dispatching change event"
        );

        for callback in &callbacks {
            callback(event);
        }

        callbacks.len()
    }

    /// Collects matching callbacks while holding the read lock.
    fn matching(&self, collection: &str, event: &str) -> Vec<EventCallback> {
        let table = self.table.read();

        let Some(routes) = table.routes.get(collection) else {
            return Vec::new();
        };

        let mut ids: Vec<SubscriptionId> = routes.any.clone();
        if let Some(named) = routes.named.get(event) {
            ids.extend_from_slice(named);
        }
        ids.sort_unstable();

        ids.iter()
            .filter_map(|id| match table.subscribers.get(id) {
                Some(subscriber) => Some(Arc::clone(&subscriber.callback)),
                None => {
                    warn!(%id, "Route points at missing subscriber");
                    None
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use proptest::prelude::*;
    use serde_json::json;

    fn counter() -> (Arc<AtomicUsize>, EventCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = Arc::clone(&count);
        let callback: EventCallback = Arc::new(move |_: &ChangeEvent| {
            clone.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn test_routing_predicate() {
        let dispatcher = Dispatcher::new();
        let (posts_any, cb1) = counter();
        let (posts_update, cb2) = counter();
        let (comments_any, cb3) = counter();

        dispatcher.register("posts", EventSelector::Any, cb1);
        dispatcher.register("posts", EventSelector::from("update"), cb2);
        dispatcher.register("comments", EventSelector::Any, cb3);

        let delivered = dispatcher
            .dispatch_frame(r#"{"collection":"posts","event":"create","id":5}"#)
            .expect("valid frame");

        assert_eq!(delivered, 1);
        assert_eq!(posts_any.load(Ordering::SeqCst), 1);
        assert_eq!(posts_update.load(Ordering::SeqCst), 0);
        assert_eq!(comments_any.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_full_payload_delivered_once() {
        let dispatcher = Dispatcher::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        dispatcher.register(
            "posts",
            EventSelector::Any,
            Arc::new(move |event: &ChangeEvent| sink.lock().push(event.to_value())),
        );

        dispatcher
            .dispatch_frame(r#"{"collection":"posts","event":"create","id":5,"extra":{"a":[1,2]}}"#)
            .expect("valid frame");

        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0],
            json!({ "collection": "posts", "event": "create", "id": 5, "extra": { "a": [1, 2] } })
        );
    }

    #[test]
    fn test_explicit_null_data_reaches_subscriber() {
        let dispatcher = Dispatcher::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        dispatcher.register(
            "posts",
            EventSelector::Any,
            Arc::new(move |event: &ChangeEvent| sink.lock().push(event.to_value())),
        );

        let frame = json!({ "collection": "posts", "event": "create", "data": null, "id": 5 });
        dispatcher
            .dispatch_frame(&frame.to_string())
            .expect("valid frame");

        assert_eq!(*received.lock(), vec![frame]);
    }

    #[test]
    fn test_frame_without_event_reaches_nobody() {
        let dispatcher = Dispatcher::new();
        let (count, cb) = counter();
        dispatcher.register("posts", EventSelector::Any, cb);

        assert!(dispatcher.dispatch_frame(r#"{"collection":"posts","id":5}"#).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registration_order() {
        let dispatcher = Dispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, selector) in [("a", "*"), ("b", "INSERT"), ("c", "*"), ("d", "INSERT")] {
            let order = Arc::clone(&order);
            dispatcher.register(
                "users",
                EventSelector::from(selector),
                Arc::new(move |_: &ChangeEvent| order.lock().push(label)),
            );
        }

        dispatcher.dispatch(&ChangeEvent::new("users", "INSERT", json!({})));
        assert_eq!(*order.lock(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_unregister_only_removes_one() {
        let dispatcher = Dispatcher::new();
        let (first, cb1) = counter();
        let (second, cb2) = counter();

        let id1 = dispatcher.register("posts", EventSelector::from("create"), cb1);
        let id2 = dispatcher.register("posts", EventSelector::from("create"), cb2);

        assert!(dispatcher.unregister(id1));
        dispatcher.dispatch(&ChangeEvent::new("posts", "create", json!(null)));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(dispatcher.contains(id2));
        assert_eq!(dispatcher.subscriber_count(), 1);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let dispatcher = Dispatcher::new();
        let (_, cb) = counter();
        let id = dispatcher.register("posts", EventSelector::Any, cb);

        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert_eq!(dispatcher.subscriber_count(), 0);
        assert!(dispatcher.table.read().routes.is_empty());
    }

    #[test]
    fn test_malformed_frame_reaches_nobody() {
        let dispatcher = Dispatcher::new();
        let (count, cb) = counter();
        dispatcher.register("posts", EventSelector::Any, cb);

        assert!(dispatcher.dispatch_frame("{not json").is_err());
        assert!(
            dispatcher
                .dispatch_frame(r#"{"message":"Welcome to ThunderBase!"}"#)
                .is_err()
        );
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_may_unsubscribe_itself() {
        let dispatcher = Arc::new(Dispatcher::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let d = Arc::clone(&dispatcher);
        let s = Arc::clone(&slot);
        let id = dispatcher.register(
            "users",
            EventSelector::Any,
            Arc::new(move |_: &ChangeEvent| {
                if let Some(id) = s.lock().take() {
                    d.unregister(id);
                }
            }),
        );
        *slot.lock() = Some(id);

        assert_eq!(dispatcher.dispatch(&ChangeEvent::new("users", "DELETE", json!({}))), 1);
        assert_eq!(dispatcher.dispatch(&ChangeEvent::new("users", "DELETE", json!({}))), 0);
    }

    proptest! {
        #[test]
        fn prop_delivery_matches_predicate(
            sub_collection in "[a-c]",
            sub_event in prop_oneof![Just("*".to_string()), "[xyz]"],
            msg_collection in "[a-c]",
            msg_event in "[xyz]",
        ) {
            let dispatcher = Dispatcher::new();
            let (count, cb) = counter();
            dispatcher.register(&sub_collection, EventSelector::from(sub_event.as_str()), cb);

            dispatcher.dispatch(&ChangeEvent::new(msg_collection.as_str(), msg_event.as_str(), json!(null)));

            let expected = sub_collection == msg_collection
                && (sub_event == "*" || sub_event == msg_event);
            prop_assert_eq!(count.load(Ordering::SeqCst), usize::from(expected));
        }
    }
}
