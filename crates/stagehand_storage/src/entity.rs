//! Generational entity allocation.
//!
//! The `EntityStore` hands out entity ids and tracks generations so that
//! handles to deleted entities are detected instead of aliasing a reused
//! slot.

use stagehand_foundation::{EntityId, Error, ErrorKind, Result};
use tracing::debug;

/// Allocates entity ids and tracks which are live.
///
/// Freed indices are reused; each reuse bumps the slot's generation. A slot
/// that has run out of generations is retired instead of reused.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    /// Generation counter for each entity index.
    /// Even generations are free, odd generations are alive.
    generations: Vec<u32>,
    /// Free list of indices available for reuse.
    free_list: Vec<u32>,
    /// Count of live entities.
    live_count: usize,
}

impl EntityStore {
    /// Creates a new empty entity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the index space is exhausted.
    pub fn spawn(&mut self) -> Result<EntityId> {
        if let Some(index) = self.free_list.pop() {
            let generation = &mut self.generations[index as usize];
            *generation = generation.checked_add(1).ok_or_else(generation_overflow)?;
            self.live_count += 1;
            return Ok(EntityId::new(index, *generation));
        }

        // u32::MAX is the null sentinel and is never handed out.
        let index = u32::try_from(self.generations.len())
            .ok()
            .filter(|index| *index != u32::MAX)
            .ok_or_else(|| {
                Error::new(ErrorKind::Internal("entity index space exhausted".to_string()))
            })?;
        self.generations.push(1);
        self.live_count += 1;
        Ok(EntityId::new(index, 1))
    }

    /// Frees an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is stale or was never allocated.
    pub fn destroy(&mut self, id: EntityId) -> Result<()> {
        self.validate(id)?;

        let generation = &mut self.generations[id.index as usize];
        *generation = generation.checked_add(1).ok_or_else(generation_overflow)?;
        self.live_count -= 1;

        // Reuse needs a live generation and a free one after it.
        if generation.checked_add(2).is_some() {
            self.free_list.push(id.index);
        } else {
            debug!(target: "stagehand::storage", index = id.index, "entity slot retired");
        }
        Ok(())
    }

    /// Returns true if the entity is live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.validate(id).is_ok()
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// Returns `StaleEntity` on a generation mismatch and `EntityNotFound`
    /// for an index that was never allocated or is currently free.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        let Some(&current) = self.generations.get(id.index as usize) else {
            return Err(Error::entity_not_found(id));
        };

        if current != id.generation {
            return Err(Error::stale_entity(id));
        }

        if current % 2 == 0 {
            return Err(Error::entity_not_found(id));
        }

        Ok(())
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live entity ids in index order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.generations
            .iter()
            .zip(0u32..)
            .filter(|(generation, _)| *generation % 2 == 1)
            .map(|(generation, index)| EntityId::new(index, *generation))
    }
}

fn generation_overflow() -> Error {
    Error::new(ErrorKind::Internal("entity generation overflow".to_string()))
}
