//! Per-type row batching.
//!
//! A [`TypeBatch`] accumulates every instance of one concrete entity type
//! encountered during a single save, then writes them in three passes:
//!
//! 1. [`execute`](TypeBatch::execute) - one batched INSERT/UPDATE per
//!    partition, with store-generated ids written back into the instances;
//! 2. [`fix_foreign_keys`](TypeBatch::fix_foreign_keys) - batched UPDATEs
//!    patching foreign-key columns whose dependent ids were unknown at
//!    insert time;
//! 3. [`fix_back_references`](TypeBatch::fix_back_references) - batched
//!    UPDATEs patching each one-to-many child's back-reference column.
//!
//! The passes are driven breadth-first across *all* batches by the save
//! transaction, so an id assigned by any batch in pass *k* is visible to
//! every batch in pass *k+1*.

use graft_core::{
    DmlKind, Entity, EntityRef, Error, ForeignKeyDef, InstanceKey, Mapper, MapperRegistry, Result,
    Store, UpdateRow, Value,
};
use std::collections::HashSet;

/// A foreign-key column left NULL at insert time, to be patched once the
/// dependent's id exists.
struct FkFixup {
    owner: EntityRef,
    fk: ForeignKeyDef,
}

/// Accumulates and writes all instances of one concrete entity type.
pub struct TypeBatch<'a> {
    registry: &'a MapperRegistry,
    mapper: &'a Mapper,
    kind: DmlKind,
    entries: Vec<EntityRef>,
    seen: HashSet<InstanceKey>,
    fk_fixups: Vec<FkFixup>,
}

impl<'a> TypeBatch<'a> {
    /// Create an empty batch for `mapper`'s entity type.
    #[must_use]
    pub fn new(registry: &'a MapperRegistry, mapper: &'a Mapper, kind: DmlKind) -> Self {
        Self {
            registry,
            mapper,
            kind,
            entries: Vec::new(),
            seen: HashSet::new(),
            fk_fixups: Vec::new(),
        }
    }

    /// The mapper this batch writes through.
    #[must_use]
    pub fn mapper(&self) -> &'a Mapper {
        self.mapper
    }

    /// Set-insert by instance identity.
    ///
    /// Returns `true` iff the instance was newly added. A `false` return
    /// tells the walker not to recurse into this instance again, which is
    /// what terminates traversal on cyclic graphs.
    pub fn add(&mut self, entity: &EntityRef) -> bool {
        if self.seen.insert(entity.identity()) {
            self.entries.push(entity.clone());
            true
        } else {
            false
        }
    }

    /// Number of accumulated instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the accumulated rows.
    ///
    /// Instances are partitioned by id state. For store-generated-id
    /// types: id present means UPDATE, id absent means INSERT with the id
    /// column omitted and the generated id written back. For
    /// caller-assigned-id types every instance is INSERTed with its
    /// explicit id, and an absent id is invalid data.
    ///
    /// Foreign-key columns referencing a dependent whose id is still
    /// unknown are written NULL and recorded for `fix_foreign_keys`.
    #[tracing::instrument(level = "debug", skip_all, fields(table = self.mapper.table()))]
    pub fn execute<S: Store>(&mut self, store: &mut S) -> Result<()> {
        let mut fixups = Vec::new();
        let mut insert_rows: Vec<Vec<Value>> = Vec::new();
        let mut inserted: Vec<EntityRef> = Vec::new();
        let mut update_rows: Vec<UpdateRow> = Vec::new();
        let auto_id = self.mapper.is_id_auto_generated();

        for entity in &self.entries {
            let id = self.mapper.id_value(&entity.read());
            if auto_id && !id.is_null() {
                let values = self.build_values(entity, &mut fixups)?;
                update_rows.push(UpdateRow::new(id, values));
            } else if auto_id {
                insert_rows.push(self.build_values(entity, &mut fixups)?);
                inserted.push(entity.clone());
            } else if id.is_null() {
                return Err(Error::invalid_data(
                    self.mapper.entity_type().name(),
                    self.mapper.id_field(),
                    "caller-assigned id is missing",
                ));
            } else {
                let mut values = vec![id];
                values.extend(self.build_values(entity, &mut fixups)?);
                insert_rows.push(values);
            }
        }
        self.fk_fixups = fixups;

        if !insert_rows.is_empty() {
            let columns = self.insert_columns();
            let row_count = insert_rows.len();
            tracing::debug!(rows = row_count, "executing insert batch");
            let ids =
                store.execute_batch_insert(self.mapper.table(), &columns, insert_rows)?;
            if ids.len() != row_count {
                return Err(Error::store(format!(
                    "store returned {} generated ids for {} inserted rows on {}",
                    ids.len(),
                    row_count,
                    self.mapper.table()
                )));
            }
            for (entity, id) in inserted.iter().zip(ids) {
                if auto_id {
                    if id.is_null() {
                        return Err(Error::store(format!(
                            "store generated no id for a row of {}",
                            self.mapper.table()
                        )));
                    }
                    self.mapper.assign_id(&mut entity.write(), id);
                }
            }
        }

        if !update_rows.is_empty() {
            let columns = self.value_columns();
            tracing::debug!(rows = update_rows.len(), "executing update batch");
            store.execute_batch_update(
                self.mapper.table(),
                self.mapper.id_column(),
                &columns,
                update_rows,
            )?;
        }

        Ok(())
    }

    /// Patch foreign-key columns recorded as unresolved during `execute`.
    ///
    /// By the time this runs, every batch has executed, so every dependent
    /// persisted in this transaction carries its id. A dependent still
    /// without an id on a non-nullable foreign key is invalid data; on a
    /// nullable one the column simply stays NULL.
    #[tracing::instrument(level = "debug", skip_all, fields(table = self.mapper.table()))]
    pub fn fix_foreign_keys<S: Store>(&self, store: &mut S) -> Result<()> {
        for fk in self.mapper.foreign_keys() {
            let mut rows = Vec::new();
            for fixup in self.fk_fixups.iter().filter(|f| f.fk.field == fk.field) {
                let owner = fixup.owner.read();
                let owner_id = self.mapper.id_value(&owner);
                let Some(dependent) = owner.reference(fk.field) else {
                    continue;
                };
                let dependent_id = self.id_of(&dependent)?;
                if dependent_id.is_null() {
                    if fk.nullable {
                        continue;
                    }
                    return Err(Error::invalid_data(
                        self.mapper.entity_type().name(),
                        fk.field,
                        "required foreign key still has no id after the insert phase",
                    ));
                }
                rows.push(UpdateRow::new(owner_id, vec![dependent_id]));
            }
            if !rows.is_empty() {
                tracing::debug!(column = fk.column, rows = rows.len(), "patching foreign keys");
                store.execute_batch_update(
                    self.mapper.table(),
                    self.mapper.id_column(),
                    &[fk.column],
                    rows,
                )?;
            }
        }
        Ok(())
    }

    /// Patch each one-to-many child's back-reference column to this
    /// batch's parent ids.
    ///
    /// The back-reference is never part of the child's own row - the
    /// child's mapper does not know it exists - so it is written here,
    /// once every parent id is known. Updates are batched per child
    /// table, keyed by the child's id column.
    #[tracing::instrument(level = "debug", skip_all, fields(table = self.mapper.table()))]
    pub fn fix_back_references<S: Store>(&self, store: &mut S) -> Result<()> {
        for assoc in self.mapper.one_to_many_fields() {
            if !assoc.cascade.allows(self.kind) {
                continue;
            }
            // child tables can differ per concrete member type
            let mut per_table: Vec<(&'static str, &'static str, Vec<UpdateRow>)> = Vec::new();
            for entity in &self.entries {
                let parent = entity.read();
                let parent_id = self.mapper.id_value(&parent);
                if parent_id.is_null() {
                    return Err(Error::invalid_data(
                        self.mapper.entity_type().name(),
                        self.mapper.id_field(),
                        "parent id still unresolved after the insert phase",
                    ));
                }
                for member in parent.collection(assoc.field).into_iter().flatten() {
                    let child = member.read();
                    let child_mapper = self.registry.mapper_for(child.entity_type())?;
                    let child_id = child_mapper.id_value(&child);
                    if child_id.is_null() {
                        return Err(Error::invalid_data(
                            child.entity_type().name(),
                            assoc.referenced_column,
                            "child has no id after the insert phase",
                        ));
                    }
                    let row = UpdateRow::new(child_id, vec![parent_id.clone()]);
                    match per_table
                        .iter_mut()
                        .find(|(table, _, _)| *table == child_mapper.table())
                    {
                        Some((_, _, rows)) => rows.push(row),
                        None => per_table.push((
                            child_mapper.table(),
                            child_mapper.id_column(),
                            vec![row],
                        )),
                    }
                }
            }
            for (table, key_column, rows) in per_table {
                tracing::debug!(
                    child_table = table,
                    column = assoc.referenced_column,
                    rows = rows.len(),
                    "patching back references"
                );
                store.execute_batch_update(table, key_column, &[assoc.referenced_column], rows)?;
            }
        }
        Ok(())
    }

    /// Columns of a full value row: scalars then foreign keys, in
    /// declaration order.
    fn value_columns(&self) -> Vec<&'static str> {
        self.mapper
            .columns()
            .iter()
            .map(|c| c.column)
            .chain(self.mapper.foreign_keys().iter().map(|fk| fk.column))
            .collect()
    }

    /// Columns of an insert row; caller-assigned ids lead the row.
    fn insert_columns(&self) -> Vec<&'static str> {
        if self.mapper.is_id_auto_generated() {
            self.value_columns()
        } else {
            let mut columns = vec![self.mapper.id_column()];
            columns.extend(self.value_columns());
            columns
        }
    }

    /// Build one instance's values, aligned with `value_columns`.
    fn build_values(&self, entity: &EntityRef, fixups: &mut Vec<FkFixup>) -> Result<Vec<Value>> {
        let guard = entity.read();
        let mut values: Vec<Value> = self
            .mapper
            .columns()
            .iter()
            .map(|c| guard.value(c.field))
            .collect();
        for fk in self.mapper.foreign_keys() {
            values.push(self.foreign_key_value(entity, &guard, fk, fixups)?);
        }
        Ok(values)
    }

    /// Resolve one foreign-key column value at row-build time.
    fn foreign_key_value(
        &self,
        entity: &EntityRef,
        guard: &Entity,
        fk: &ForeignKeyDef,
        fixups: &mut Vec<FkFixup>,
    ) -> Result<Value> {
        match guard.reference(fk.field) {
            Some(dependent) => {
                let id = self.id_of(&dependent)?;
                if id.is_null() {
                    // dependent inserted in this transaction; patch later
                    fixups.push(FkFixup {
                        owner: entity.clone(),
                        fk: *fk,
                    });
                    Ok(Value::Null)
                } else {
                    Ok(id)
                }
            }
            None if fk.nullable => Ok(Value::Null),
            None => Err(Error::invalid_data(
                self.mapper.entity_type().name(),
                fk.field,
                "required foreign key references no entity",
            )),
        }
    }

    /// Read an entity's id through the mapper of its concrete type.
    fn id_of(&self, entity: &EntityRef) -> Result<Value> {
        let guard = entity.read();
        let mapper = self.registry.mapper_for(guard.entity_type())?;
        Ok(mapper.id_value(&guard))
    }
}
