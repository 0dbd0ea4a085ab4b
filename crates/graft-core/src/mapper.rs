//! Per-type persistence metadata.
//!
//! A [`Mapper`] is the complete write-path description of one entity type:
//! its table, its identifier, its scalar columns, and its relation edges.
//! Mappers are immutable after construction and shared read-only for the
//! life of the registry.

use crate::entity::{Entity, EntityTypeId};
use crate::field::ColumnDef;
use crate::relationship::{ForeignKeyDef, ManyToManyDef, OneToManyDef};
use crate::value::Value;

/// Write-path metadata for one entity type.
#[derive(Debug, Clone)]
pub struct Mapper {
    entity_type: EntityTypeId,
    table: &'static str,
    id_field: &'static str,
    id_column: &'static str,
    id_auto_generated: bool,
    columns: Vec<ColumnDef>,
    foreign_keys: Vec<ForeignKeyDef>,
    one_to_many: Vec<OneToManyDef>,
    many_to_many: Vec<ManyToManyDef>,
}

impl Mapper {
    /// Create a mapper with a store-generated id column named `"id"`.
    #[must_use]
    pub fn new(entity_type: EntityTypeId, table: &'static str) -> Self {
        Self {
            entity_type,
            table,
            id_field: "id",
            id_column: "id",
            id_auto_generated: true,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            one_to_many: Vec::new(),
            many_to_many: Vec::new(),
        }
    }

    /// Set the id field and column names.
    #[must_use]
    pub fn id(mut self, field: &'static str, column: &'static str) -> Self {
        self.id_field = field;
        self.id_column = column;
        self
    }

    /// Set whether the id is assigned by the store on insert.
    #[must_use]
    pub fn id_auto_generated(mut self, value: bool) -> Self {
        self.id_auto_generated = value;
        self
    }

    /// Append a scalar column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a foreign-key field.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKeyDef) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Append a one-to-many association.
    #[must_use]
    pub fn one_to_many(mut self, assoc: OneToManyDef) -> Self {
        self.one_to_many.push(assoc);
        self
    }

    /// Append a many-to-many association.
    #[must_use]
    pub fn many_to_many(mut self, assoc: ManyToManyDef) -> Self {
        self.many_to_many.push(assoc);
        self
    }

    /// The entity type this mapper describes.
    #[must_use]
    pub fn entity_type(&self) -> EntityTypeId {
        self.entity_type
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// The id field name on the entity.
    #[must_use]
    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    /// The id column name on the table.
    #[must_use]
    pub fn id_column(&self) -> &'static str {
        self.id_column
    }

    /// Whether the store assigns the id on insert.
    #[must_use]
    pub fn is_id_auto_generated(&self) -> bool {
        self.id_auto_generated
    }

    /// Ordered scalar columns (id excluded).
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Ordered foreign-key fields.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKeyDef] {
        &self.foreign_keys
    }

    /// Ordered one-to-many associations.
    #[must_use]
    pub fn one_to_many_fields(&self) -> &[OneToManyDef] {
        &self.one_to_many
    }

    /// Ordered many-to-many associations.
    #[must_use]
    pub fn many_to_many_fields(&self) -> &[ManyToManyDef] {
        &self.many_to_many
    }

    /// Read the id value of an instance (`Null` when unassigned).
    #[must_use]
    pub fn id_value(&self, entity: &Entity) -> Value {
        entity.value(self.id_field)
    }

    /// Write an assigned id back into an instance.
    pub fn assign_id(&self, entity: &mut Entity, id: Value) {
        entity.set(self.id_field, id);
    }
}
