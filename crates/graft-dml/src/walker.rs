//! Policy-gated graph traversal.
//!
//! The [`GraphWalker`] owns all batch state for one save invocation and
//! fills it by walking the object graph depth-first from the root. Its
//! only side effect is populating [`TypeBatch`]/[`JoinBatch`] collections;
//! nothing touches the store until the walk is complete.
//!
//! Termination on cyclic graphs falls out of the identity set-insert: an
//! instance is processed the first time it is seen and never again, so a
//! back-reference to an already-queued instance is a no-op.

use crate::join_batch::JoinBatch;
use crate::type_batch::TypeBatch;
use graft_core::{DmlKind, EntityRef, EntityTypeId, ManyToManyDef, MapperRegistry, Result};
use std::collections::HashMap;

/// Traverses an object graph, routing instances into per-type and
/// per-join-table batches.
///
/// Batches are kept in first-encounter order so the phased commit visits
/// them deterministically; correctness does not depend on that order.
pub struct GraphWalker<'a> {
    registry: &'a MapperRegistry,
    kind: DmlKind,
    type_batches: Vec<TypeBatch<'a>>,
    type_index: HashMap<EntityTypeId, usize>,
    join_batches: Vec<JoinBatch<'a>>,
    join_index: HashMap<&'static str, usize>,
}

impl<'a> GraphWalker<'a> {
    /// Create a walker for one save invocation.
    #[must_use]
    pub fn new(registry: &'a MapperRegistry, kind: DmlKind) -> Self {
        Self {
            registry,
            kind,
            type_batches: Vec::new(),
            type_index: HashMap::new(),
            join_batches: Vec::new(),
            join_index: HashMap::new(),
        }
    }

    /// Visit an entity and, on first encounter, everything reachable from
    /// it through cascade-admitted relations.
    ///
    /// `None` is the recursion base case, not an error: absent references
    /// and null collection elements end the walk silently. An entity whose
    /// concrete type has no registered mapper is a fatal configuration
    /// error.
    pub fn visit(&mut self, entity: Option<&EntityRef>) -> Result<()> {
        let Some(entity) = entity else {
            return Ok(());
        };

        // dispatch on the concrete runtime tag, never a declared type
        let registry = self.registry;
        let concrete = entity.read().entity_type();
        let mapper = registry.mapper_for(concrete)?;

        let index = match self.type_index.get(&concrete) {
            Some(&index) => index,
            None => {
                let index = self.type_batches.len();
                self.type_batches
                    .push(TypeBatch::new(registry, mapper, self.kind));
                self.type_index.insert(concrete, index);
                index
            }
        };
        if !self.type_batches[index].add(entity) {
            return Ok(());
        }

        // gather the admitted edges under one read guard, then recurse
        // with the guard released
        let mut to_one = Vec::new();
        let mut to_many = Vec::new();
        let mut linked: Vec<(ManyToManyDef, Vec<EntityRef>)> = Vec::new();
        let owner_id_unresolved = {
            let guard = entity.read();
            for fk in mapper.foreign_keys() {
                if fk.cascade.allows(self.kind) {
                    if let Some(target) = guard.reference(fk.field) {
                        to_one.push(target);
                    }
                }
            }
            for assoc in mapper.one_to_many_fields() {
                if assoc.cascade.allows(self.kind) {
                    to_many.extend(guard.collection(assoc.field).into_iter().flatten());
                }
            }
            for assoc in mapper.many_to_many_fields() {
                if assoc.cascade.allows(self.kind) {
                    let members: Vec<EntityRef> =
                        guard.collection(assoc.field).into_iter().flatten().collect();
                    if !members.is_empty() {
                        linked.push((*assoc, members));
                    }
                }
            }
            mapper.id_value(&guard).is_null()
        };

        for target in &to_one {
            self.visit(Some(target))?;
        }
        for member in &to_many {
            self.visit(Some(member))?;
        }
        for (assoc, members) in &linked {
            for member in members {
                self.visit(Some(member))?;
                // a pair with both ids already known is already linked;
                // only unresolved endpoints need a join row
                let member_id_unresolved = {
                    let guard = member.read();
                    registry
                        .mapper_for(guard.entity_type())?
                        .id_value(&guard)
                        .is_null()
                };
                if owner_id_unresolved || member_id_unresolved {
                    self.join_batch_for(assoc).add(entity, member);
                }
            }
        }

        Ok(())
    }

    /// Look up or lazily create the join batch for an association's join
    /// table.
    fn join_batch_for(&mut self, assoc: &ManyToManyDef) -> &mut JoinBatch<'a> {
        let table = assoc.join_table.table;
        let index = match self.join_index.get(table) {
            Some(&index) => index,
            None => {
                let index = self.join_batches.len();
                self.join_batches
                    .push(JoinBatch::new(self.registry, assoc.join_table));
                self.join_index.insert(table, index);
                index
            }
        };
        &mut self.join_batches[index]
    }

    /// The accumulated per-type batches, in first-encounter order.
    #[must_use]
    pub fn type_batches(&self) -> &[TypeBatch<'a>] {
        &self.type_batches
    }

    /// The accumulated join batches, in first-encounter order.
    #[must_use]
    pub fn join_batches(&self) -> &[JoinBatch<'a>] {
        &self.join_batches
    }

    /// Consume the walker, yielding its batches for the commit phases.
    #[must_use]
    pub fn into_batches(self) -> (Vec<TypeBatch<'a>>, Vec<JoinBatch<'a>>) {
        (self.type_batches, self.join_batches)
    }
}
