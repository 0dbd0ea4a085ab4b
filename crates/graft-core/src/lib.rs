//! Core types and traits for Graft.
//!
//! This crate provides the foundational abstractions of the write path:
//!
//! - [`Entity`] / [`EntityRef`] - the in-memory object graph, shared by
//!   identity
//! - [`Mapper`] / [`MapperRegistry`] - per-type persistence metadata,
//!   registered once at startup
//! - [`Cascade`] / [`DmlKind`] - per-field, per-operation propagation
//!   policy
//! - [`Store`] - the batch-execution boundary to the relational store
//! - [`Value`] - dynamically-typed column values
//! - [`Error`] - the fatal error kinds of the save path

pub mod entity;
pub mod error;
pub mod field;
pub mod mapper;
pub mod registry;
pub mod relationship;
pub mod store;
pub mod value;

pub use entity::{Entity, EntityRef, EntityTypeId, FieldValue, InstanceKey};
pub use error::{Error, InvalidDataError, Result, StoreError, UnmappedTypeError};
pub use field::ColumnDef;
pub use mapper::Mapper;
pub use registry::MapperRegistry;
pub use relationship::{Cascade, DmlKind, ForeignKeyDef, JoinTableDef, ManyToManyDef, OneToManyDef};
pub use store::{Store, UpdateRow};
pub use value::Value;
