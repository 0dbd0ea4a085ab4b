//! Cascading save transactions for Graft.
//!
//! Given an object graph rooted at one [`EntityRef`](graft_core::EntityRef),
//! this crate persists the entire reachable graph to a relational store:
//! traversal is gated by per-relation cascade policy, rows of one type are
//! batched together, and foreign-key / join-table dependencies are
//! resolved by a phased commit instead of a per-row ordering.
//!
//! # Overview
//!
//! - [`GraphWalker`] - walks the graph depth-first from the root,
//!   deduplicating by instance identity and routing instances into
//!   batches. Terminates on cyclic graphs.
//! - [`TypeBatch`] - all instances of one concrete type: batched
//!   INSERT/UPDATE, id write-back, foreign-key and back-reference fixups.
//! - [`JoinBatch`] - (owner, member) id pairs for one many-to-many join
//!   table, inserted last, once both endpoint ids exist.
//! - [`SaveTransaction`] - the entry point: one walk, then four store
//!   phases breadth-first across all batches.
//!
//! # Example
//!
//! ```ignore
//! use graft_core::{Cascade, ColumnDef, Entity, EntityRef, EntityTypeId,
//!     Mapper, MapperRegistry, OneToManyDef};
//! use graft_dml::save;
//!
//! const ORDER: EntityTypeId = EntityTypeId::new("Order");
//! const ITEM: EntityTypeId = EntityTypeId::new("Item");
//!
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
//! let mut order = Entity::new(ORDER).with("number", 1001_i64);
//! order.set_collection("items", vec![
//!     Some(EntityRef::new(Entity::new(ITEM).with("sku", "A-1"))),
//!     Some(EntityRef::new(Entity::new(ITEM).with("sku", "A-2"))),
//! ]);
//! let order = EntityRef::new(order);
//!
//! // `conn` is any Store implementation, already inside a transaction
//! let order_id = save(&registry, &mut conn, &order)?;
//! ```

pub mod join_batch;
pub mod save;
pub mod type_batch;
pub mod walker;

pub use join_batch::JoinBatch;
pub use save::{SaveTransaction, save, update};
pub use type_batch::TypeBatch;
pub use walker::GraphWalker;
