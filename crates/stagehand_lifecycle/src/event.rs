//! Lifecycle events and the publish contract.
//!
//! The [`LifecycleManager`] hands every event to an [`EventPublisher`] as an
//! [`EventContext`]. Publishing is synchronous: `publish` returns only after
//! every interested listener has run, and only then does the component move
//! to its settled stage.

use std::fmt;

use stagehand_foundation::{ComponentTypeId, EntityId, LifeStage, LifecycleOp, Result};

use crate::component::Component;
use crate::manager::LifecycleManager;

/// A notification published at a lifecycle transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Published while the component is `Adding`.
    Add,
    /// Published while the component is `Initializing`.
    Initialize,
    /// Published while the component is `Starting`.
    Startup,
    /// Published while the component is `Stopping`.
    Shutdown,
    /// Published while the component is `Removing`.
    Remove,
}

impl LifecycleEvent {
    /// All events, in lifecycle order.
    pub const ALL: [LifecycleEvent; 5] = [
        LifecycleEvent::Add,
        LifecycleEvent::Initialize,
        LifecycleEvent::Startup,
        LifecycleEvent::Shutdown,
        LifecycleEvent::Remove,
    ];

    /// Returns the event published by an entry point.
    #[must_use]
    pub const fn for_op(op: LifecycleOp) -> Self {
        match op {
            LifecycleOp::AddToEntity => Self::Add,
            LifecycleOp::Initialize => Self::Initialize,
            LifecycleOp::Startup => Self::Startup,
            LifecycleOp::Shutdown => Self::Shutdown,
            LifecycleOp::RemoveFromEntity => Self::Remove,
        }
    }

    /// Returns true if the caller supplies the routing type for this event.
    ///
    /// The other events are routed by the type the record was created with.
    #[must_use]
    pub const fn is_type_scoped(self) -> bool {
        matches!(self, Self::Add | Self::Initialize)
    }

    /// Returns the stage every listener observes during this event.
    #[must_use]
    pub const fn stage(self) -> LifeStage {
        match self {
            Self::Add => LifeStage::Adding,
            Self::Initialize => LifeStage::Initializing,
            Self::Startup => LifeStage::Starting,
            Self::Shutdown => LifeStage::Stopping,
            Self::Remove => LifeStage::Removing,
        }
    }

    /// Returns the lowercase name of this event.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Initialize => "initialize",
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a listener receives: the event, the component, and a handle back
/// into the lifecycle for reentrant removal.
///
/// `'a` is the duration of one publish call; `'p` is the publisher borrow
/// held by the manager.
pub struct EventContext<'a, 'p> {
    event: LifecycleEvent,
    type_id: ComponentTypeId,
    component: &'a mut dyn Component,
    lifecycle: &'a LifecycleManager<'p>,
}

impl<'a, 'p> EventContext<'a, 'p> {
    pub(crate) fn new(
        event: LifecycleEvent,
        type_id: ComponentTypeId,
        component: &'a mut dyn Component,
        lifecycle: &'a LifecycleManager<'p>,
    ) -> Self {
        Self {
            event,
            type_id,
            component,
            lifecycle,
        }
    }

    /// Returns the event being published.
    #[must_use]
    pub fn event(&self) -> LifecycleEvent {
        self.event
    }

    /// Returns the type this event is routed to.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Returns the entity owning the component.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.component.life().owner()
    }

    /// Returns the component's current stage.
    #[must_use]
    pub fn stage(&self) -> LifeStage {
        self.component.stage()
    }

    /// Returns true once the component has been removed during this event.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.event != LifecycleEvent::Remove && self.stage().is_removing_or_deleted()
    }

    /// Returns the component.
    #[must_use]
    pub fn component(&self) -> &dyn Component {
        &*self.component
    }

    /// Returns the component mutably.
    pub fn component_mut(&mut self) -> &mut dyn Component {
        &mut *self.component
    }

    /// Returns the payload if the component is a `ComponentRecord<T>`.
    #[must_use]
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.component().payload::<T>()
    }

    /// Returns the payload mutably if the component is a `ComponentRecord<T>`.
    pub fn payload_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.component_mut().payload_mut::<T>()
    }

    /// Returns the lifecycle manager publishing this event.
    #[must_use]
    pub fn lifecycle(&self) -> &'a LifecycleManager<'p> {
        self.lifecycle
    }

    /// Removes the component from inside a listener.
    ///
    /// Runs shutdown (skipped for a component that never reached `Running`)
    /// and then removal. The entry point that published this event leaves
    /// the component `Deleted` when it returns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the component is already being removed.
    pub fn remove_component(&mut self) -> Result<()> {
        let lifecycle = self.lifecycle;
        lifecycle.remove(&mut *self.component)
    }
}

impl fmt::Debug for EventContext<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("event", &self.event)
            .field("type_id", &self.type_id)
            .field("life", self.component.life())
            .finish_non_exhaustive()
    }
}

/// Delivers lifecycle events to listeners.
///
/// Implementations must deliver synchronously, preserve per-component event
/// order, and return only after every interested listener has finished.
/// Listener failures are the publisher's to handle; `publish` cannot fail.
pub trait EventPublisher {
    /// Delivers `ctx.event()` for `ctx.component()` to every interested
    /// listener.
    fn publish(&self, ctx: &mut EventContext<'_, '_>);
}

/// A publisher with no listeners.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _ctx: &mut EventContext<'_, '_>) {}
}

impl<P: EventPublisher + ?Sized> EventPublisher for &P {
    fn publish(&self, ctx: &mut EventContext<'_, '_>) {
        (**self).publish(ctx);
    }
}
