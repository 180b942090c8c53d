//! A single-threaded event bus for lifecycle events.
//!
//! Listeners subscribe per component type and event, or for an event on
//! every type. Delivery order is type listeners first, then global
//! listeners, each in subscription order.
//!
//! The listener list is snapshotted before delivery, so listeners may
//! subscribe, unsubscribe, or trigger further lifecycle events (reentrant
//! removal publishes `Remove` from inside another event) without
//! invalidating the iteration in progress.
//!
//! Every snapshotted listener is called, even after an earlier listener has
//! removed the component. Later listeners see it `Deleted` and can check
//! [`EventContext::is_removed`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use stagehand_foundation::{ComponentTypeId, Result};
use tracing::{debug, warn};

use crate::event::{EventContext, EventPublisher, LifecycleEvent};

/// A lifecycle event listener.
///
/// A returned error is logged by the bus and does not stop delivery to the
/// remaining listeners.
pub type Listener = dyn Fn(&mut EventContext<'_, '_>) -> Result<()>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Scope {
    Type(ComponentTypeId),
    All,
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    listener: Rc<Listener>,
}

/// Registry of lifecycle listeners implementing [`EventPublisher`].
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<(Scope, LifecycleEvent), Vec<Subscription>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `event` for components of `type_id`.
    pub fn subscribe<F>(&self, type_id: ComponentTypeId, event: LifecycleEvent, listener: F) -> SubscriptionId
    where
        F: Fn(&mut EventContext<'_, '_>) -> Result<()> + 'static,
    {
        self.insert(Scope::Type(type_id), event, Rc::new(listener))
    }

    /// Subscribes to `event` for components of every type.
    pub fn subscribe_all<F>(&self, event: LifecycleEvent, listener: F) -> SubscriptionId
    where
        F: Fn(&mut EventContext<'_, '_>) -> Result<()> + 'static,
    {
        self.insert(Scope::All, event, Rc::new(listener))
    }

    /// Removes a subscription. Returns false if it was already gone.
    ///
    /// An event already being delivered still reaches the listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        for subscriptions in listeners.values_mut() {
            if let Some(pos) = subscriptions.iter().position(|s| s.id == id) {
                subscriptions.remove(pos);
                return true;
            }
        }
        false
    }

    /// Returns the number of listeners that would receive `event` for a
    /// component of `type_id`, global listeners included.
    #[must_use]
    pub fn listener_count(&self, type_id: ComponentTypeId, event: LifecycleEvent) -> usize {
        let listeners = self.listeners.borrow();
        let count = |scope| listeners.get(&(scope, event)).map_or(0, Vec::len);
        count(Scope::Type(type_id)) + count(Scope::All)
    }

    /// Returns true if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().values().all(Vec::is_empty)
    }

    fn insert(&self, scope: Scope, event: LifecycleEvent, listener: Rc<Listener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.listeners
            .borrow_mut()
            .entry((scope, event))
            .or_default()
            .push(Subscription { id, listener });
        id
    }

    fn snapshot(&self, type_id: ComponentTypeId, event: LifecycleEvent) -> Vec<Subscription> {
        let listeners = self.listeners.borrow();
        [Scope::Type(type_id), Scope::All]
            .iter()
            .filter_map(|scope| listeners.get(&(*scope, event)))
            .flatten()
            .cloned()
            .collect()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, ctx: &mut EventContext<'_, '_>) {
        let event = ctx.event();
        let mut removed = false;
        for subscription in self.snapshot(ctx.type_id(), event) {
            if !removed && ctx.is_removed() {
                removed = true;
                debug!(
                    target: "stagehand::bus",
                    entity = %ctx.owner(),
                    %event,
                    "component removed mid-event, remaining listeners see it deleted"
                );
            }

            if let Err(err) = (subscription.listener)(ctx) {
                warn!(
                    target: "stagehand::bus",
                    entity = %ctx.owner(),
                    component = %ctx.type_id(),
                    %event,
                    subscription = subscription.id.0,
                    error = %err,
                    "lifecycle listener failed"
                );
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_struct("EventBus")
            .field("subscriptions", &listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
