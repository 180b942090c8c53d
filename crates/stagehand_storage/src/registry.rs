//! Component type registration.
//!
//! Maps component type names to dense [`ComponentTypeId`]s. Listeners
//! subscribe by id; names exist for diagnostics and lookups from data.

use std::collections::HashMap;
use std::sync::Arc;

use stagehand_foundation::{ComponentTypeId, Error, ErrorKind, Result};

/// Registry of component type names.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    /// Names by id index.
    names: Vec<Arc<str>>,
    /// Map from name to id.
    ids: HashMap<Arc<str>, ComponentTypeId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component type name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered.
    pub fn register(&mut self, name: &str) -> Result<ComponentTypeId> {
        if self.ids.contains_key(name) {
            return Err(Error::new(ErrorKind::DuplicateComponentType(name.to_string())));
        }

        let index = u32::try_from(self.names.len())
            .map_err(|_| Error::new(ErrorKind::Internal("too many component types".to_string())))?;
        let id = ComponentTypeId::new(index);
        let name: Arc<str> = name.into();
        self.names.push(Arc::clone(&name));
        self.ids.insert(name, id);
        Ok(id)
    }

    /// Looks up a registered type by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if the name was never registered.
    pub fn lookup(&self, name: &str) -> Result<ComponentTypeId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::UnknownComponentType(name.to_string())))
    }

    /// Returns the name a type was registered under.
    #[must_use]
    pub fn name(&self, id: ComponentTypeId) -> Option<&str> {
        self.names.get(id.index() as usize).map(AsRef::as_ref)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
