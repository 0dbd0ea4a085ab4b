//! The init-time mapper registry.
//!
//! All type metadata is registered once at startup; the save path only
//! ever performs lookups. An entity type encountered during traversal
//! with no registered mapper is a fatal configuration error.

use crate::entity::EntityTypeId;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use std::collections::HashMap;

/// Registry mapping entity type tags to their [`Mapper`]s.
#[derive(Debug, Default)]
pub struct MapperRegistry {
    mappers: HashMap<EntityTypeId, Mapper>,
}

impl MapperRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper.
    ///
    /// # Panics
    ///
    /// Panics if the type is already registered - duplicate registration
    /// is a startup configuration bug, not a runtime condition.
    #[must_use]
    pub fn register(mut self, mapper: Mapper) -> Self {
        let entity_type = mapper.entity_type();
        let previous = self.mappers.insert(entity_type, mapper);
        assert!(
            previous.is_none(),
            "mapper for {entity_type} registered twice"
        );
        self
    }

    /// Look up the mapper for a concrete entity type.
    pub fn mapper_for(&self, entity_type: EntityTypeId) -> Result<&Mapper> {
        self.mappers
            .get(&entity_type)
            .ok_or_else(|| Error::unmapped_type(entity_type.name()))
    }

    /// Whether a type is registered.
    #[must_use]
    pub fn contains(&self, entity_type: EntityTypeId) -> bool {
        self.mappers.contains_key(&entity_type)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}
