//! In-memory entity instances and identity-based handles.
//!
//! An [`Entity`] is one node of the object graph handed to the save path:
//! a runtime type tag plus named field values. Entities are shared - the
//! same child instance may be reachable from several parents, and graphs
//! may contain reference cycles - so the graph is built from [`EntityRef`]
//! handles and every deduplication decision is keyed by *instance
//! identity* ([`InstanceKey`]), never by field values.
//!
//! # Example
//!
//! ```
//! use graft_core::{Entity, EntityRef, EntityTypeId, Value};
//!
//! const ORDER: EntityTypeId = EntityTypeId::new("Order");
//! const ITEM: EntityTypeId = EntityTypeId::new("Item");
//!
//! let item = EntityRef::new(Entity::new(ITEM).with("sku", "A-1"));
//! let mut order = Entity::new(ORDER).with("number", 1001_i64);
//! order.set_collection("items", vec![Some(item.clone())]);
//!
//! let order = EntityRef::new(order);
//! assert_eq!(order.read().value("number"), Value::BigInt(1001));
//! assert!(order.read().collection("items")[0].as_ref().unwrap().ptr_eq(&item));
//! ```

use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Runtime type tag identifying an entity type in the mapper registry.
///
/// Tags are interned names declared once at startup; comparing two tags is
/// a pointer-sized comparison. The tag on an instance is its *concrete*
/// type - traversal always dispatches on it, never on a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityTypeId(&'static str);

impl EntityTypeId {
    /// Create a type tag from its registered name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The registered type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The value of one entity field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A scalar column value.
    Scalar(Value),
    /// A to-one association. `None` models an unset reference.
    Ref(Option<EntityRef>),
    /// A to-many association. `None` elements are tolerated and skipped
    /// by traversal.
    Collection(Vec<Option<EntityRef>>),
}

/// An in-memory record corresponding to one row of one table.
///
/// Entities are opaque to the engine: all structure comes from the
/// [`Mapper`](crate::Mapper) registered for the type tag. The engine only
/// reads fields and, after insertion, writes the assigned id back.
#[derive(Debug, Clone)]
pub struct Entity {
    entity_type: EntityTypeId,
    fields: HashMap<&'static str, FieldValue>,
}

impl Entity {
    /// Create an empty entity of the given concrete type.
    #[must_use]
    pub fn new(entity_type: EntityTypeId) -> Self {
        Self {
            entity_type,
            fields: HashMap::new(),
        }
    }

    /// The concrete runtime type of this instance.
    #[must_use]
    pub fn entity_type(&self) -> EntityTypeId {
        self.entity_type
    }

    /// Set a scalar field.
    pub fn set(&mut self, field: &'static str, value: impl Into<Value>) {
        self.fields.insert(field, FieldValue::Scalar(value.into()));
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a to-one association field.
    pub fn set_reference(&mut self, field: &'static str, target: Option<EntityRef>) {
        self.fields.insert(field, FieldValue::Ref(target));
    }

    /// Set a to-many association field.
    pub fn set_collection(&mut self, field: &'static str, members: Vec<Option<EntityRef>>) {
        self.fields.insert(field, FieldValue::Collection(members));
    }

    /// Read a scalar field. Absent or non-scalar fields read as `Null`.
    #[must_use]
    pub fn value(&self, field: &str) -> Value {
        match self.fields.get(field) {
            Some(FieldValue::Scalar(v)) => v.clone(),
            _ => Value::Null,
        }
    }

    /// Read a to-one association field. Absent or unset references are `None`.
    #[must_use]
    pub fn reference(&self, field: &str) -> Option<EntityRef> {
        match self.fields.get(field) {
            Some(FieldValue::Ref(target)) => target.clone(),
            _ => None,
        }
    }

    /// Read a to-many association field. Absent fields read as empty.
    #[must_use]
    pub fn collection(&self, field: &str) -> Vec<Option<EntityRef>> {
        match self.fields.get(field) {
            Some(FieldValue::Collection(members)) => members.clone(),
            _ => Vec::new(),
        }
    }

    /// Raw access to a field value, if set.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

/// Identity key for one entity instance.
///
/// Derived from the allocation of the owning [`EntityRef`]: two keys are
/// equal exactly when they name the same in-memory instance. Stable for
/// the life of the handle, which outlives any save invocation that sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceKey(usize);

/// A shared, mutable handle to an [`Entity`].
///
/// Cloning the handle shares the instance; the save path mutates entities
/// through it when writing assigned ids back. The graph is assumed
/// exclusively owned by the calling thread for the duration of a save, so
/// lock acquisition is expected to be uncontended.
#[derive(Clone)]
pub struct EntityRef {
    inner: Arc<RwLock<Entity>>,
}

impl EntityRef {
    /// Wrap an entity in a shared handle.
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            inner: Arc::new(RwLock::new(entity)),
        }
    }

    /// Read access to the entity.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, Entity> {
        self.inner.read().expect("entity lock poisoned")
    }

    /// Write access to the entity.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, Entity> {
        self.inner.write().expect("entity lock poisoned")
    }

    /// The identity key of this instance.
    #[must_use]
    pub fn identity(&self) -> InstanceKey {
        InstanceKey(Arc::as_ptr(&self.inner) as usize)
    }

    /// Whether two handles name the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.read();
        f.debug_struct("EntityRef")
            .field("type", &entity.entity_type())
            .field("identity", &self.identity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: EntityTypeId = EntityTypeId::new("User");
    const TEAM: EntityTypeId = EntityTypeId::new("Team");

    #[test]
    fn test_scalar_fields_roundtrip() {
        let user = Entity::new(USER).with("name", "Alice").with("age", 30_i32);
        assert_eq!(user.value("name"), Value::Text("Alice".to_string()));
        assert_eq!(user.value("age"), Value::Int(30));
        assert_eq!(user.value("missing"), Value::Null);
    }

    #[test]
    fn test_reference_field() {
        let team = EntityRef::new(Entity::new(TEAM));
        let mut user = Entity::new(USER);
        user.set_reference("team", Some(team.clone()));

        let read_back = user.reference("team").unwrap();
        assert!(read_back.ptr_eq(&team));
        assert!(user.reference("missing").is_none());
    }

    #[test]
    fn test_unset_reference_is_none() {
        let mut user = Entity::new(USER);
        user.set_reference("team", None);
        assert!(user.reference("team").is_none());
    }

    #[test]
    fn test_collection_field_with_null_element() {
        let member = EntityRef::new(Entity::new(USER));
        let mut team = Entity::new(TEAM);
        team.set_collection("members", vec![Some(member.clone()), None]);

        let members = team.collection("members");
        assert_eq!(members.len(), 2);
        assert!(members[0].as_ref().unwrap().ptr_eq(&member));
        assert!(members[1].is_none());
        assert!(team.collection("missing").is_empty());
    }

    #[test]
    fn test_identity_distinguishes_equal_values() {
        let a = EntityRef::new(Entity::new(USER).with("name", "Alice"));
        let b = EntityRef::new(Entity::new(USER).with("name", "Alice"));

        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.identity(), a.clone().identity());
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn test_writes_visible_through_clones() {
        let user = EntityRef::new(Entity::new(USER));
        let alias = user.clone();

        user.write().set("name", "Bob");
        assert_eq!(alias.read().value("name"), Value::Text("Bob".to_string()));
    }

    #[test]
    fn test_concrete_type_tag() {
        let user = Entity::new(USER);
        assert_eq!(user.entity_type(), USER);
        assert_eq!(user.entity_type().name(), "User");
    }
}
