//! Relationship descriptors and cascade policy.
//!
//! Relationships are declared once at startup as static metadata on each
//! [`Mapper`](crate::Mapper). This keeps the save path free of runtime
//! reflection: the walker reads descriptors, the descriptors name entity
//! fields and columns, and every policy decision is a table lookup.

use crate::entity::EntityTypeId;
use serde::{Deserialize, Serialize};

/// The kind of write operation a transaction performs.
///
/// Cascade policy is evaluated against the operation kind: a relation is
/// traversed only when its [`Cascade`] admits the kind of the running
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmlKind {
    /// Persist new rows, cascading into new dependents.
    Save,
    /// Update existing rows.
    Update,
    /// Remove rows. Declared here so cascade policy can gate it; the save
    /// path itself never deletes.
    Delete,
}

/// Per-field cascade policy: one gate per operation kind.
///
/// Evaluated once per field during traversal, not re-derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cascade {
    /// Propagate save operations into this relation.
    pub save: bool,
    /// Propagate update operations into this relation.
    pub update: bool,
    /// Propagate delete operations into this relation.
    pub delete: bool,
}

impl Cascade {
    /// No operation propagates.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            save: false,
            update: false,
            delete: false,
        }
    }

    /// Every operation propagates.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            save: true,
            update: true,
            delete: true,
        }
    }

    /// Only saves propagate.
    #[must_use]
    pub const fn save() -> Self {
        Self {
            save: true,
            update: false,
            delete: false,
        }
    }

    /// Saves and updates propagate.
    #[must_use]
    pub const fn save_update() -> Self {
        Self {
            save: true,
            update: true,
            delete: false,
        }
    }

    /// Whether this policy admits the given operation kind.
    #[must_use]
    pub const fn allows(&self, kind: DmlKind) -> bool {
        match kind {
            DmlKind::Save => self.save,
            DmlKind::Update => self.update,
            DmlKind::Delete => self.delete,
        }
    }
}

/// A foreign-key field: a to-one association whose column lives on the
/// owner's row.
///
/// The dependent must exist before the owner's row can reference it; the
/// phased commit decouples write order from that dependency, so the
/// descriptor only names the edge.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKeyDef {
    /// Entity field holding the referenced instance.
    pub field: &'static str,
    /// Foreign-key column on the owner's table.
    pub column: &'static str,
    /// Declared type of the dependent.
    pub references: EntityTypeId,
    /// Whether the column accepts NULL. A non-nullable foreign key that
    /// resolves to no id is invalid data.
    pub nullable: bool,
    /// Cascade policy for this edge.
    pub cascade: Cascade,
}

impl ForeignKeyDef {
    /// Create a non-nullable foreign key with no cascade.
    #[must_use]
    pub const fn new(
        field: &'static str,
        column: &'static str,
        references: EntityTypeId,
    ) -> Self {
        Self {
            field,
            column,
            references,
            nullable: false,
            cascade: Cascade::none(),
        }
    }

    /// Set the nullable flag.
    #[must_use]
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set the cascade policy.
    #[must_use]
    pub const fn cascade(mut self, policy: Cascade) -> Self {
        self.cascade = policy;
        self
    }
}

/// A one-to-many association: the owner's collection field, with the
/// back-reference column living on each member's row.
#[derive(Debug, Clone, Copy)]
pub struct OneToManyDef {
    /// Entity field holding the member collection.
    pub field: &'static str,
    /// Declared element type of the collection.
    pub member_type: EntityTypeId,
    /// Column on the member's table pointing back at the owner. Not
    /// pre-set in memory; filled in once the owner's id is known.
    pub referenced_column: &'static str,
    /// Cascade policy for this edge.
    pub cascade: Cascade,
}

impl OneToManyDef {
    /// Create a one-to-many association with no cascade.
    #[must_use]
    pub const fn new(
        field: &'static str,
        member_type: EntityTypeId,
        referenced_column: &'static str,
    ) -> Self {
        Self {
            field,
            member_type,
            referenced_column,
            cascade: Cascade::none(),
        }
    }

    /// Set the cascade policy.
    #[must_use]
    pub const fn cascade(mut self, policy: Cascade) -> Self {
        self.cascade = policy;
        self
    }
}

/// The join table backing a many-to-many association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTableDef {
    /// The join table name (e.g. `"order_tags"`).
    pub table: &'static str,
    /// Column holding the owner's id (e.g. `"order_id"`).
    pub owner_column: &'static str,
    /// Column holding the member's id (e.g. `"tag_id"`).
    pub member_column: &'static str,
}

impl JoinTableDef {
    /// Create a join-table definition.
    #[must_use]
    pub const fn new(
        table: &'static str,
        owner_column: &'static str,
        member_column: &'static str,
    ) -> Self {
        Self {
            table,
            owner_column,
            member_column,
        }
    }
}

/// A many-to-many association: the owner's collection field plus the join
/// table storing (owner id, member id) pairs.
#[derive(Debug, Clone, Copy)]
pub struct ManyToManyDef {
    /// Entity field holding the member collection.
    pub field: &'static str,
    /// Declared element type of the collection.
    pub member_type: EntityTypeId,
    /// The join table for this association.
    pub join_table: JoinTableDef,
    /// Cascade policy for this edge.
    pub cascade: Cascade,
}

impl ManyToManyDef {
    /// Create a many-to-many association with no cascade.
    #[must_use]
    pub const fn new(
        field: &'static str,
        member_type: EntityTypeId,
        join_table: JoinTableDef,
    ) -> Self {
        Self {
            field,
            member_type,
            join_table,
            cascade: Cascade::none(),
        }
    }

    /// Set the cascade policy.
    #[must_use]
    pub const fn cascade(mut self, policy: Cascade) -> Self {
        self.cascade = policy;
        self
    }
}
