//! The component lifecycle state machine.
//!
//! [`LifecycleManager`] is the only writer of a component's stage and the
//! only caller of the publisher for lifecycle events. Each entry point
//! validates the current stage, moves to the in-flight stage, publishes,
//! and then settles.
//!
//! # Reentrant removal
//!
//! A listener may remove the component it is being notified about (for
//! example, a component that removes itself during its own startup). The
//! entry point that published the event then finds the component past its
//! in-flight stage and leaves it `Deleted` instead of settling. No other
//! entry point may be re-entered; doing so fails its stage precondition.

use stagehand_foundation::{ComponentTypeId, LifeStage, LifecycleOp, Result, Tick};
use tracing::{debug, trace, warn};

use crate::checker;
use crate::component::Component;
use crate::config::LifecycleConfig;
use crate::event::{EventContext, EventPublisher, LifecycleEvent};

/// Drives components through their lifecycle stages.
///
/// Holds the publisher by shared reference, so listeners can reach back in
/// through [`EventContext::lifecycle`] while an event is being published.
/// Transitions for one component must be externally serialized.
pub struct LifecycleManager<'p> {
    publisher: &'p dyn EventPublisher,
    config: LifecycleConfig,
}

impl<'p> LifecycleManager<'p> {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new(publisher: &'p dyn EventPublisher) -> Self {
        Self::with_config(publisher, LifecycleConfig::default())
    }

    /// Creates a manager with an explicit configuration.
    #[must_use]
    pub fn with_config(publisher: &'p dyn EventPublisher, config: LifecycleConfig) -> Self {
        Self { publisher, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// `PreAdd → Adding → Added`, publishing [`LifecycleEvent::Add`] to
    /// listeners of `type_id`.
    ///
    /// Stamps both the creation and last-modified tick with `tick`, so a
    /// freshly added component reads as dirty to change tracking.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the component is `PreAdd`.
    pub fn add_to_entity(
        &self,
        component: &mut dyn Component,
        type_id: ComponentTypeId,
        tick: Tick,
    ) -> Result<()> {
        self.guard(LifecycleOp::AddToEntity, component)?;

        self.set_stage(component, LifeStage::Adding);
        component.life_mut().stamp_added(tick);
        self.publish(LifecycleEvent::Add, type_id, component);
        self.settle(LifecycleOp::AddToEntity, component);
        Ok(())
    }

    /// `Added → Initializing → Initialized`, publishing
    /// [`LifecycleEvent::Initialize`] to listeners of `type_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the component is `Added`.
    pub fn initialize(&self, component: &mut dyn Component, type_id: ComponentTypeId) -> Result<()> {
        self.guard(LifecycleOp::Initialize, component)?;

        self.set_stage(component, LifeStage::Initializing);
        self.publish(LifecycleEvent::Initialize, type_id, component);
        self.settle(LifecycleOp::Initialize, component);
        Ok(())
    }

    /// `Initialized → Starting → Running`, publishing
    /// [`LifecycleEvent::Startup`].
    ///
    /// Listeners may remove the component; it then ends `Deleted` and never
    /// reaches `Running`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the component is `Initialized`.
    pub fn startup(&self, component: &mut dyn Component) -> Result<()> {
        self.guard(LifecycleOp::Startup, component)?;

        self.set_stage(component, LifeStage::Starting);
        let type_id = component.life().type_id();
        self.publish(LifecycleEvent::Startup, type_id, component);
        self.settle(LifecycleOp::Startup, component);
        Ok(())
    }

    /// Moves an `Initialized` or `Running` component to `Stopped`.
    ///
    /// A component that never reached `Running` goes straight to `Stopped`
    /// without an event. Otherwise `Stopping → Stopped`, publishing
    /// [`LifecycleEvent::Shutdown`].
    ///
    /// Components still `Initializing` or `Starting` can only be stopped by
    /// removing them from a listener, through [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for any other stage, including a stage
    /// that is mid-event.
    pub fn shutdown(&self, component: &mut dyn Component) -> Result<()> {
        self.guard(LifecycleOp::Shutdown, component)?;
        self.stop(component);
        Ok(())
    }

    /// Shutdown without the precondition check: skips the event for a
    /// component that never reached `Running`.
    fn stop(&self, component: &mut dyn Component) {
        let stage = component.stage();
        if checker::skips_shutdown_event(stage) {
            debug!(
                target: "stagehand::lifecycle",
                entity = %component.life().owner(),
                component = %component.life().type_id(),
                %stage,
                "component never started, skipping shutdown event"
            );
            self.set_stage(component, LifeStage::Stopped);
            return;
        }

        self.set_stage(component, LifeStage::Stopping);
        let type_id = component.life().type_id();
        self.publish(LifecycleEvent::Shutdown, type_id, component);
        self.settle(LifecycleOp::Shutdown, component);
    }

    /// `attached → Removing → Deleted`, publishing
    /// [`LifecycleEvent::Remove`].
    ///
    /// May be called from inside a listener of any other event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the component is `PreAdd`, or is
    /// already `Removing` or `Deleted`.
    pub fn remove_from_entity(&self, component: &mut dyn Component) -> Result<()> {
        self.guard(LifecycleOp::RemoveFromEntity, component)?;

        if component.stage().is_transitional() {
            debug!(
                target: "stagehand::lifecycle",
                entity = %component.life().owner(),
                component = %component.life().type_id(),
                stage = %component.stage(),
                "removing component from inside its own lifecycle event"
            );
        }

        self.set_stage(component, LifeStage::Removing);
        let type_id = component.life().type_id();
        self.publish(LifecycleEvent::Remove, type_id, component);
        self.settle(LifecycleOp::RemoveFromEntity, component);
        Ok(())
    }

    /// Tears a component down: shutdown when its stage calls for one, then
    /// removal.
    ///
    /// This is what the entity manager runs when a component is removed,
    /// and what [`EventContext::remove_component`] runs from a listener.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the component cannot be removed.
    pub fn remove(&self, component: &mut dyn Component) -> Result<()> {
        if checker::stops_before_removal(component.stage()) {
            self.stop(component);
            if component.stage().is_terminal() {
                return Ok(());
            }
        }
        self.remove_from_entity(component)
    }

    /// Validates the precondition of `op`.
    ///
    /// Strict mode treats a violation as an assertion failure.
    fn guard(&self, op: LifecycleOp, component: &dyn Component) -> Result<()> {
        let Err(err) = checker::check(op, component.life()) else {
            return Ok(());
        };

        if self.config.strict {
            panic!("lifecycle invariant violated: {err}");
        }

        warn!(
            target: "stagehand::lifecycle",
            entity = %component.life().owner(),
            component = %component.life().type_id(),
            %op,
            stage = %component.stage(),
            "rejected invalid lifecycle transition"
        );
        Err(err)
    }

    fn publish(&self, event: LifecycleEvent, type_id: ComponentTypeId, component: &mut dyn Component) {
        let mut ctx = EventContext::new(event, type_id, component, self);
        self.publisher.publish(&mut ctx);
    }

    /// Moves from the in-flight stage to the settled stage, unless a
    /// listener removed the component in the meantime.
    fn settle(&self, op: LifecycleOp, component: &mut dyn Component) {
        let stage = component.stage();
        if stage == op.in_flight_stage() {
            self.set_stage(component, op.settled_stage());
        } else {
            debug!(
                target: "stagehand::lifecycle",
                entity = %component.life().owner(),
                component = %component.life().type_id(),
                %op,
                %stage,
                "component removed during its own event, not settling"
            );
        }
    }

    fn set_stage(&self, component: &mut dyn Component, stage: LifeStage) {
        let life = component.life_mut();
        if self.config.trace_transitions {
            trace!(
                target: "stagehand::lifecycle",
                entity = %life.owner(),
                component = %life.type_id(),
                from = %life.stage(),
                to = %stage,
                "stage transition"
            );
        }
        life.set_stage(stage);
    }
}

impl std::fmt::Debug for LifecycleManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
