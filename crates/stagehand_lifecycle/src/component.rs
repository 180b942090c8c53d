//! Component records and the lifecycle state they carry.
//!
//! Every component embeds a [`ComponentLife`]: its owner, its registered
//! type, its current [`LifeStage`], and its tick stamps. Only the
//! [`LifecycleManager`](crate::LifecycleManager) writes the stage.

use std::any::Any;

use stagehand_foundation::{ComponentTypeId, EntityId, LifeStage, Tick};

/// Lifecycle state shared by every component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentLife {
    owner: EntityId,
    type_id: ComponentTypeId,
    stage: LifeStage,
    creation_tick: Tick,
    last_modified_tick: Tick,
}

impl ComponentLife {
    /// Creates lifecycle state for a component that has not been added yet.
    #[must_use]
    pub fn new(owner: EntityId, type_id: ComponentTypeId) -> Self {
        Self {
            owner,
            type_id,
            stage: LifeStage::PreAdd,
            creation_tick: Tick::ZERO,
            last_modified_tick: Tick::ZERO,
        }
    }

    /// Returns the entity that owns this component.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Returns the type this component was registered under.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Returns the current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> LifeStage {
        self.stage
    }

    /// Returns the tick the component was added on.
    #[must_use]
    pub fn creation_tick(&self) -> Tick {
        self.creation_tick
    }

    /// Returns the tick the component was last modified on.
    #[must_use]
    pub fn last_modified_tick(&self) -> Tick {
        self.last_modified_tick
    }

    /// Records a modification at `tick`.
    ///
    /// Ticks never move backwards; an older tick is ignored.
    pub fn mark_modified(&mut self, tick: Tick) {
        if tick > self.last_modified_tick {
            self.last_modified_tick = tick;
        }
    }

    pub(crate) fn set_stage(&mut self, stage: LifeStage) {
        self.stage = stage;
    }

    /// A freshly added component counts as modified on the tick it was added.
    pub(crate) fn stamp_added(&mut self, tick: Tick) {
        self.creation_tick = tick;
        self.last_modified_tick = tick;
    }
}

/// A unit of entity-owned data that takes part in the lifecycle.
///
/// Implemented by [`ComponentRecord`]; hosts with their own record layout
/// can implement it directly.
pub trait Component: Any {
    /// Returns the lifecycle state.
    fn life(&self) -> &ComponentLife;

    /// Returns the lifecycle state mutably.
    ///
    /// The stage itself stays read-only outside this crate.
    fn life_mut(&mut self) -> &mut ComponentLife;

    /// Upcasts to `Any` for payload downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `Any` for payload downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the current lifecycle stage.
    fn stage(&self) -> LifeStage {
        self.life().stage()
    }
}

impl dyn Component {
    /// Returns the payload if this is a `ComponentRecord<T>`.
    #[must_use]
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.as_any()
            .downcast_ref::<ComponentRecord<T>>()
            .map(ComponentRecord::data)
    }

    /// Returns the payload mutably if this is a `ComponentRecord<T>`.
    pub fn payload_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut()
            .downcast_mut::<ComponentRecord<T>>()
            .map(ComponentRecord::data_mut)
    }
}

/// A component: lifecycle state plus a domain payload.
#[derive(Clone, Debug)]
pub struct ComponentRecord<T> {
    life: ComponentLife,
    data: T,
}

impl<T> ComponentRecord<T> {
    /// Creates a record in `PreAdd` for `owner`.
    #[must_use]
    pub fn new(owner: EntityId, type_id: ComponentTypeId, data: T) -> Self {
        Self {
            life: ComponentLife::new(owner, type_id),
            data,
        }
    }

    /// Creates a record owned by no entity.
    #[must_use]
    pub fn detached(type_id: ComponentTypeId, data: T) -> Self {
        Self::new(EntityId::null(), type_id, data)
    }

    /// Returns the payload.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the payload mutably.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// Consumes the record, returning its payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: 'static> Component for ComponentRecord<T> {
    fn life(&self) -> &ComponentLife {
        &self.life
    }

    fn life_mut(&mut self) -> &mut ComponentLife {
        &mut self.life
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
