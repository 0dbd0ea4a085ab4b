//! Graft - cascading entity-graph persistence for relational stores.
//!
//! Graft takes an in-memory object graph rooted at one entity and writes
//! the entire reachable graph in a handful of batched statements, honoring
//! per-relation cascade policy and resolving foreign-key and join-table
//! dependencies with a phased commit.
//!
//! # Quick start
//!
//! ```ignore
//! use graft::{Cascade, ColumnDef, Entity, EntityRef, EntityTypeId,
//!     Mapper, MapperRegistry, OneToManyDef, save};
//!
//! const ORDER: EntityTypeId = EntityTypeId::new("Order");
//! const ITEM: EntityTypeId = EntityTypeId::new("Item");
//!
//! // Metadata is registered once at startup.
//! let registry = MapperRegistry::new()
//!     .register(
//!         Mapper::new(ORDER, "orders")
//!             .column(ColumnDef::new("number"))
//!             .one_to_many(
//!                 OneToManyDef::new("items", ITEM, "order_id")
//!                     .cascade(Cascade::save_update()),
//!             ),
//!     )
//!     .register(Mapper::new(ITEM, "items").column(ColumnDef::new("sku")));
//!
//! // Build a graph and save it. Both item rows get store-assigned ids and
//! // an order_id pointing at the newly inserted order.
//! let mut order = Entity::new(ORDER).with("number", 1001_i64);
//! order.set_collection("items", vec![
//!     Some(EntityRef::new(Entity::new(ITEM).with("sku", "A-1"))),
//!     Some(EntityRef::new(Entity::new(ITEM).with("sku", "A-2"))),
//! ]);
//! let order = EntityRef::new(order);
//!
//! let order_id = save(&registry, &mut conn, &order)?;
//! ```

pub use graft_core::{
    Cascade, ColumnDef, DmlKind, Entity, EntityRef, EntityTypeId, Error, FieldValue,
    ForeignKeyDef, InstanceKey, InvalidDataError, JoinTableDef, ManyToManyDef, Mapper,
    MapperRegistry, OneToManyDef, Result, Store, StoreError, UnmappedTypeError, UpdateRow, Value,
};
pub use graft_dml::{GraphWalker, JoinBatch, SaveTransaction, TypeBatch, save, update};
