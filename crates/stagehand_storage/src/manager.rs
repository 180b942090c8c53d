//! The entity manager: owns component records and drives their lifecycle.
//!
//! Entities move through their own coarse stages. Components added to an
//! entity are brought up to the entity's stage:
//!
//! | Entity stage  | Entry points run on `add_component`      |
//! |---------------|------------------------------------------|
//! | `PreInit`     | add                                      |
//! | `Initialized` | add, initialize                          |
//! | `Running`     | add, initialize, startup                 |
//!
//! Removal always runs shutdown (when the component's stage calls for
//! one) followed by removal, then discards the record. A record deleted
//! from inside one of its own listeners is discarded as soon as the entry
//! point that published the event returns.

use std::collections::HashMap;

use stagehand_foundation::{
    ComponentTypeId, EntityId, Error, ErrorContext, ErrorKind, LifeStage, Result, Tick,
};
use stagehand_lifecycle::{
    Component, ComponentRecord, EventPublisher, LifecycleConfig, LifecycleManager,
};
use tracing::debug;

use crate::entity::EntityStore;
use crate::registry::ComponentRegistry;

/// Coarse stage of an entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityStage {
    /// Spawned; components are added but not initialized.
    PreInit,
    /// Components are initialized but not started.
    Initialized,
    /// Components are running.
    Running,
}

#[derive(Debug)]
struct EntityData {
    stage: EntityStage,
    /// Component types in attach order.
    components: Vec<ComponentTypeId>,
}

/// Owns entities and their component records.
pub struct EntityManager<'p> {
    entities: EntityStore,
    data: HashMap<EntityId, EntityData>,
    components: HashMap<(EntityId, ComponentTypeId), Box<dyn Component>>,
    registry: ComponentRegistry,
    lifecycle: LifecycleManager<'p>,
    tick: Tick,
}

impl<'p> EntityManager<'p> {
    /// Creates an empty manager publishing through `publisher`.
    #[must_use]
    pub fn new(publisher: &'p dyn EventPublisher) -> Self {
        Self::with_config(publisher, LifecycleConfig::default())
    }

    /// Creates an empty manager with an explicit lifecycle configuration.
    #[must_use]
    pub fn with_config(publisher: &'p dyn EventPublisher, config: LifecycleConfig) -> Self {
        Self {
            entities: EntityStore::new(),
            data: HashMap::new(),
            components: HashMap::new(),
            registry: ComponentRegistry::new(),
            lifecycle: LifecycleManager::with_config(publisher, config),
            tick: Tick::ZERO,
        }
    }

    /// Returns the lifecycle manager.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleManager<'p> {
        &self.lifecycle
    }

    // =========================================================================
    // Component Types
    // =========================================================================

    /// Registers a component type name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered.
    pub fn register_component(&mut self, name: &str) -> Result<ComponentTypeId> {
        self.registry.register(name)
    }

    /// Returns the component type registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    // =========================================================================
    // Ticks
    // =========================================================================

    /// Returns the current tick.
    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Advances to the next tick and returns it.
    pub fn advance_tick(&mut self) -> Tick {
        self.tick = self.tick.next();
        self.tick
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Spawns an entity in [`EntityStage::PreInit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the entity index space is exhausted.
    pub fn spawn(&mut self) -> Result<EntityId> {
        let entity = self.entities.spawn()?;
        self.data.insert(
            entity,
            EntityData {
                stage: EntityStage::PreInit,
                components: Vec::new(),
            },
        );
        Ok(entity)
    }

    /// Spawns an entity already in [`EntityStage::Running`].
    ///
    /// # Errors
    ///
    /// Returns an error if the entity index space is exhausted.
    pub fn spawn_started(&mut self) -> Result<EntityId> {
        let entity = self.spawn()?;
        self.start_entity(entity)?;
        Ok(entity)
    }

    /// Returns true if the entity is live.
    #[must_use]
    pub fn exists(&self, entity: EntityId) -> bool {
        self.entities.exists(entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns an entity's stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn entity_stage(&self, entity: EntityId) -> Result<EntityStage> {
        Ok(self.entity_data(entity)?.stage)
    }

    /// Initializes every component attached to a `PreInit` entity.
    ///
    /// Does nothing for an entity that is already initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live, or if a component's
    /// transition is rejected.
    pub fn initialize_entity(&mut self, entity: EntityId) -> Result<()> {
        if self.entity_stage(entity)? != EntityStage::PreInit {
            return Ok(());
        }

        for type_id in self.component_types(entity)? {
            self.drive(entity, type_id, |lifecycle, component| {
                if component.stage() == LifeStage::Added {
                    lifecycle.initialize(component, type_id)?;
                }
                Ok(())
            })
            .map_err(|err| err.with_note(format!("while initializing {entity}")))?;
        }
        self.entity_data_mut(entity)?.stage = EntityStage::Initialized;
        Ok(())
    }

    /// Starts every component attached to an entity, initializing first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live, or if a component's
    /// transition is rejected.
    pub fn start_entity(&mut self, entity: EntityId) -> Result<()> {
        match self.entity_stage(entity)? {
            EntityStage::Running => return Ok(()),
            EntityStage::PreInit => self.initialize_entity(entity)?,
            EntityStage::Initialized => {}
        }

        for type_id in self.component_types(entity)? {
            self.drive(entity, type_id, |lifecycle, component| {
                if component.stage() == LifeStage::Initialized {
                    lifecycle.startup(component)?;
                }
                Ok(())
            })
            .map_err(|err| err.with_note(format!("while starting {entity}")))?;
        }
        self.entity_data_mut(entity)?.stage = EntityStage::Running;
        Ok(())
    }

    /// Removes every component from an entity, most recently attached
    /// first, then frees the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn delete_entity(&mut self, entity: EntityId) -> Result<()> {
        for type_id in self.component_types(entity)?.into_iter().rev() {
            self.remove_component(entity, type_id)
                .map_err(|err| err.with_note(format!("while deleting {entity}")))?;
        }

        self.data.remove(&entity);
        self.entities.destroy(entity)?;
        debug!(target: "stagehand::storage", %entity, "entity deleted");
        Ok(())
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component and brings it up to the entity's stage.
    ///
    /// The record is stamped with the current tick. If one of its own
    /// listeners removes it on the way up, it is discarded and this still
    /// returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live, already has a component
    /// of this type, or a transition is rejected.
    pub fn add_component<T: 'static>(
        &mut self,
        entity: EntityId,
        type_id: ComponentTypeId,
        data: T,
    ) -> Result<()> {
        let stage = self
            .entity_stage(entity)
            .map_err(|err| err.with_context(ErrorContext::new().with_component(type_id)))?;
        if self.components.contains_key(&(entity, type_id)) {
            return Err(Error::duplicate_component(entity, type_id));
        }

        let mut component: Box<dyn Component> =
            Box::new(ComponentRecord::new(entity, type_id, data));

        self.lifecycle
            .add_to_entity(component.as_mut(), type_id, self.tick)?;
        if stage >= EntityStage::Initialized && component.stage() == LifeStage::Added {
            self.lifecycle.initialize(component.as_mut(), type_id)?;
        }
        if stage >= EntityStage::Running && component.stage() == LifeStage::Initialized {
            self.lifecycle.startup(component.as_mut())?;
        }

        if component.stage().is_terminal() {
            debug!(
                target: "stagehand::storage",
                %entity,
                component = %type_id,
                "component removed itself while attaching, record discarded"
            );
            return Ok(());
        }

        self.components.insert((entity, type_id), component);
        self.entity_data_mut(entity)?.components.push(type_id);
        Ok(())
    }

    /// Shuts down and removes a component, then discards the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live or has no such component.
    pub fn remove_component(&mut self, entity: EntityId, type_id: ComponentTypeId) -> Result<()> {
        self.entities
            .validate(entity)
            .map_err(|err| err.with_context(ErrorContext::new().with_component(type_id)))?;
        let mut component = self
            .components
            .remove(&(entity, type_id))
            .ok_or_else(|| Error::component_not_found(entity, type_id))?;
        self.detach(entity, type_id);

        self.lifecycle.remove(component.as_mut())
    }

    /// Returns true if the entity has a live component of this type.
    #[must_use]
    pub fn has(&self, entity: EntityId, type_id: ComponentTypeId) -> bool {
        self.entities.exists(entity) && self.components.contains_key(&(entity, type_id))
    }

    /// Returns the component record.
    #[must_use]
    pub fn component(&self, entity: EntityId, type_id: ComponentTypeId) -> Option<&dyn Component> {
        if !self.entities.exists(entity) {
            return None;
        }
        self.components.get(&(entity, type_id)).map(|component| &**component)
    }

    /// Returns the component's lifecycle stage.
    #[must_use]
    pub fn stage(&self, entity: EntityId, type_id: ComponentTypeId) -> Option<LifeStage> {
        self.component(entity, type_id).map(|component| component.stage())
    }

    /// Returns the component's payload.
    #[must_use]
    pub fn get<T: 'static>(&self, entity: EntityId, type_id: ComponentTypeId) -> Option<&T> {
        self.component(entity, type_id)?.payload::<T>()
    }

    /// Returns the component's payload mutably, marking it modified on the
    /// current tick.
    pub fn get_mut<T: 'static>(&mut self, entity: EntityId, type_id: ComponentTypeId) -> Option<&mut T> {
        if !self.entities.exists(entity) {
            return None;
        }
        let tick = self.tick;
        let component = self.components.get_mut(&(entity, type_id))?;
        component.payload::<T>()?;
        component.life_mut().mark_modified(tick);
        component.payload_mut::<T>()
    }

    /// Returns the component types attached to an entity, in attach order.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not live.
    pub fn component_types(&self, entity: EntityId) -> Result<Vec<ComponentTypeId>> {
        Ok(self.entity_data(entity)?.components.clone())
    }

    /// Returns the total number of live component records.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Runs `step` on a stored component, discarding it if it ends deleted.
    fn drive<F>(&mut self, entity: EntityId, type_id: ComponentTypeId, step: F) -> Result<()>
    where
        F: FnOnce(&LifecycleManager<'p>, &mut dyn Component) -> Result<()>,
    {
        let Some(component) = self.components.get_mut(&(entity, type_id)) else {
            return Err(Error::component_not_found(entity, type_id));
        };
        let result = step(&self.lifecycle, component.as_mut());

        if component.stage().is_terminal() {
            self.components.remove(&(entity, type_id));
            self.detach(entity, type_id);
            debug!(
                target: "stagehand::storage",
                %entity,
                component = %type_id,
                "component removed itself, record discarded"
            );
        }
        result
    }

    fn detach(&mut self, entity: EntityId, type_id: ComponentTypeId) {
        if let Some(data) = self.data.get_mut(&entity) {
            data.components.retain(|t| *t != type_id);
        }
    }

    fn entity_data(&self, entity: EntityId) -> Result<&EntityData> {
        self.entities.validate(entity)?;
        self.data
            .get(&entity)
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no data for live {entity:?}"))))
    }

    fn entity_data_mut(&mut self, entity: EntityId) -> Result<&mut EntityData> {
        self.entities.validate(entity)?;
        self.data
            .get_mut(&entity)
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no data for live {entity:?}"))))
    }
}

impl std::fmt::Debug for EntityManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.len())
            .field("components", &self.components.len())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}
