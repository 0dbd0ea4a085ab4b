//! The batch-execution store boundary.
//!
//! The engine never opens, closes, or wraps connections: callers hand it
//! a [`Store`] that is already inside whatever store-level transaction
//! should enclose the save, and they own rollback when the save surfaces
//! an error. `&mut self` encodes the single-connection, synchronous
//! execution model - one save runs start to finish on the calling thread
//! against one handle.

use crate::error::Result;
use crate::value::Value;

/// One row of a batched UPDATE: the key identifying the row plus the new
/// values for the set columns, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRow {
    /// Value of the key column identifying the row.
    pub key: Value,
    /// New values, aligned with the statement's set columns.
    pub values: Vec<Value>,
}

impl UpdateRow {
    /// Create an update row.
    #[must_use]
    pub fn new(key: Value, values: Vec<Value>) -> Self {
        Self { key, values }
    }
}

/// Low-level batch execution against one connection.
///
/// Implementations own SQL dialect generation and parameter binding; the
/// engine only decides *what* rows go *where* and in *which phase*.
pub trait Store {
    /// Insert `rows` into `table` in one round trip where the backend
    /// supports it.
    ///
    /// Each row's values align with `columns`. The returned vector must be
    /// ordered and aligned with the input rows; entries are the generated
    /// id for that row, or [`Value::Null`] where the store generated
    /// nothing (e.g. caller-assigned keys).
    fn execute_batch_insert(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<Vec<Value>>;

    /// Update `rows` in `table` in one round trip where the backend
    /// supports it, keyed by `key_column`.
    ///
    /// Each row's values align with `set_columns`. Returns rows affected.
    fn execute_batch_update(
        &mut self,
        table: &str,
        key_column: &str,
        set_columns: &[&str],
        rows: Vec<UpdateRow>,
    ) -> Result<u64>;
}
