//! Join-table row batching for many-to-many associations.
//!
//! A [`JoinBatch`] accumulates (owner, member) pairs destined for one join
//! table and inserts them in one batched statement during the final phase
//! of a save. Running last is what makes it correct: by then every batch
//! has executed, so both endpoint ids are resolvable.

use graft_core::{EntityRef, Error, InstanceKey, JoinTableDef, MapperRegistry, Result, Store, Value};
use std::collections::HashSet;

/// Accumulates association pairs for one join table.
pub struct JoinBatch<'a> {
    registry: &'a MapperRegistry,
    join_table: JoinTableDef,
    pairs: Vec<(EntityRef, EntityRef)>,
    seen: HashSet<(InstanceKey, InstanceKey)>,
}

impl<'a> JoinBatch<'a> {
    /// Create an empty batch for one join table.
    #[must_use]
    pub fn new(registry: &'a MapperRegistry, join_table: JoinTableDef) -> Self {
        Self {
            registry,
            join_table,
            pairs: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// The join table this batch inserts into.
    #[must_use]
    pub fn join_table(&self) -> JoinTableDef {
        self.join_table
    }

    /// Register a pair, deduplicated by (owner identity, member identity).
    ///
    /// Returns `true` iff the pair was newly added.
    pub fn add(&mut self, owner: &EntityRef, member: &EntityRef) -> bool {
        if self.seen.insert((owner.identity(), member.identity())) {
            self.pairs.push((owner.clone(), member.clone()));
            true
        } else {
            false
        }
    }

    /// Number of accumulated pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the batch holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Insert one join row per pair.
    ///
    /// Both endpoint ids must be resolved by now; an endpoint without an
    /// id means its row was never written, which is invalid data.
    #[tracing::instrument(level = "debug", skip_all, fields(table = self.join_table.table))]
    pub fn execute<S: Store>(&self, store: &mut S) -> Result<()> {
        if self.pairs.is_empty() {
            return Ok(());
        }

        let mut rows = Vec::with_capacity(self.pairs.len());
        for (owner, member) in &self.pairs {
            rows.push(vec![
                self.resolved_id(owner, self.join_table.owner_column)?,
                self.resolved_id(member, self.join_table.member_column)?,
            ]);
        }

        tracing::debug!(rows = rows.len(), "inserting join rows");
        let columns = [self.join_table.owner_column, self.join_table.member_column];
        store.execute_batch_insert(self.join_table.table, &columns, rows)?;
        Ok(())
    }

    /// Read an endpoint's id through the mapper of its concrete type.
    fn resolved_id(&self, entity: &EntityRef, column: &'static str) -> Result<Value> {
        let guard = entity.read();
        let mapper = self.registry.mapper_for(guard.entity_type())?;
        let id = mapper.id_value(&guard);
        if id.is_null() {
            return Err(Error::invalid_data(
                guard.entity_type().name(),
                column,
                "join endpoint has no id after the insert phase",
            ));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::{Entity, EntityTypeId, Mapper, UpdateRow};

    const ORDER: EntityTypeId = EntityTypeId::new("Order");
    const TAG: EntityTypeId = EntityTypeId::new("Tag");
    const JOIN: JoinTableDef = JoinTableDef::new("order_tags", "order_id", "tag_id");

    #[derive(Default)]
    struct RecordingStore {
        inserts: Vec<(String, Vec<String>, Vec<Vec<Value>>)>,
    }

    impl Store for RecordingStore {
        fn execute_batch_insert(
            &mut self,
            table: &str,
            columns: &[&str],
            rows: Vec<Vec<Value>>,
        ) -> Result<Vec<Value>> {
            let count = rows.len();
            self.inserts.push((
                table.to_string(),
                columns.iter().map(|c| (*c).to_string()).collect(),
                rows,
            ));
            Ok(vec![Value::Null; count])
        }

        fn execute_batch_update(
            &mut self,
            _table: &str,
            _key_column: &str,
            _set_columns: &[&str],
            _rows: Vec<UpdateRow>,
        ) -> Result<u64> {
            Ok(0)
        }
    }

    fn registry() -> MapperRegistry {
        MapperRegistry::new()
            .register(Mapper::new(ORDER, "orders"))
            .register(Mapper::new(TAG, "tags"))
    }

    fn with_id(entity_type: EntityTypeId, id: i64) -> EntityRef {
        EntityRef::new(Entity::new(entity_type).with("id", id))
    }

    #[test]
    fn test_add_dedups_by_identity_pair() {
        let registry = registry();
        let mut batch = JoinBatch::new(&registry, JOIN);

        let owner = with_id(ORDER, 1);
        let tag_a = with_id(TAG, 10);
        let tag_b = with_id(TAG, 11);

        assert!(batch.add(&owner, &tag_a));
        assert!(!batch.add(&owner, &tag_a));
        assert!(batch.add(&owner, &tag_b));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_execute_inserts_one_row_per_pair() {
        let registry = registry();
        let mut batch = JoinBatch::new(&registry, JOIN);
        let mut store = RecordingStore::default();

        let owner = with_id(ORDER, 1);
        batch.add(&owner, &with_id(TAG, 10));
        batch.add(&owner, &with_id(TAG, 11));
        batch.execute(&mut store).unwrap();

        let (table, columns, rows) = &store.inserts[0];
        assert_eq!(table, "order_tags");
        assert_eq!(columns, &["order_id", "tag_id"]);
        assert_eq!(
            rows,
            &vec![
                vec![Value::BigInt(1), Value::BigInt(10)],
                vec![Value::BigInt(1), Value::BigInt(11)],
            ]
        );
    }

    #[test]
    fn test_ids_read_at_execute_time_not_add_time() {
        let registry = registry();
        let mut batch = JoinBatch::new(&registry, JOIN);
        let mut store = RecordingStore::default();

        let owner = EntityRef::new(Entity::new(ORDER));
        let tag = EntityRef::new(Entity::new(TAG));
        batch.add(&owner, &tag);

        // ids arrive later, as the insert phase would assign them
        owner.write().set("id", 5_i64);
        tag.write().set("id", 6_i64);
        batch.execute(&mut store).unwrap();

        let rows = &store.inserts[0].2;
        assert_eq!(rows[0], vec![Value::BigInt(5), Value::BigInt(6)]);
    }

    #[test]
    fn test_unresolved_endpoint_is_invalid_data() {
        let registry = registry();
        let mut batch = JoinBatch::new(&registry, JOIN);
        let mut store = RecordingStore::default();

        batch.add(&with_id(ORDER, 1), &EntityRef::new(Entity::new(TAG)));
        let err = batch.execute(&mut store).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(store.inserts.is_empty());
    }

    #[test]
    fn test_empty_batch_issues_no_statement() {
        let registry = registry();
        let batch = JoinBatch::new(&registry, JOIN);
        let mut store = RecordingStore::default();

        batch.execute(&mut store).unwrap();
        assert!(store.inserts.is_empty());
    }
}
