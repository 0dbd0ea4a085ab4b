//! Shared test fixtures: an in-memory store that records every batch call
//! and assigns ids in call order.

// not every suite exercises every helper
#![allow(dead_code)]

use graft_core::{Error, Result, Store, UpdateRow, Value};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert {
        table: String,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        generated_ids: Vec<Value>,
    },
    Update {
        table: String,
        key_column: String,
        set_columns: Vec<String>,
        rows: Vec<UpdateRow>,
    },
}

/// Fake store for driving the save path end to end.
///
/// Ids are assigned in call order across all tables, so tests can predict
/// exactly which row got which id from the sequence of batches alone.
#[derive(Default)]
pub struct FakeStore {
    next_id: i64,
    /// Insert calls fail when targeting this table.
    pub fail_on_insert_into: Option<&'static str>,
    pub calls: Vec<Call>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of inserted rows across all calls.
    pub fn inserted_row_count(&self) -> usize {
        self.calls
            .iter()
            .map(|c| match c {
                Call::Insert { rows, .. } => rows.len(),
                Call::Update { .. } => 0,
            })
            .sum()
    }

    /// Rows inserted into one table, flattened across calls.
    pub fn inserted_rows(&self, table: &str) -> Vec<&Vec<Value>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Insert {
                    table: t, rows, ..
                } if t == table => Some(rows),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Update calls touching one table, in order.
    pub fn updates_to(&self, table: &str) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Update { table: t, .. } if t == table))
            .collect()
    }

    /// The value a column of one row ends up with after every recorded
    /// call is applied: the inserted value, overwritten by any later
    /// update keyed to that row's id.
    pub fn final_column_value(&self, table: &str, row_id: &Value, column: &str) -> Option<Value> {
        let mut current = None;
        for call in &self.calls {
            match call {
                Call::Insert {
                    table: t,
                    columns,
                    rows,
                    generated_ids,
                } if t == table => {
                    let Some(col_idx) = columns.iter().position(|c| c == column) else {
                        continue;
                    };
                    for (row, id) in rows.iter().zip(generated_ids) {
                        if id == row_id {
                            current = Some(row[col_idx].clone());
                        }
                    }
                }
                Call::Update {
                    table: t,
                    set_columns,
                    rows,
                    ..
                } if t == table => {
                    let Some(col_idx) = set_columns.iter().position(|c| c == column) else {
                        continue;
                    };
                    for row in rows {
                        if row.key == *row_id {
                            current = Some(row.values[col_idx].clone());
                        }
                    }
                }
                _ => {}
            }
        }
        current
    }
}

impl Store for FakeStore {
    fn execute_batch_insert(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<Vec<Value>> {
        if self.fail_on_insert_into == Some(table) {
            return Err(Error::store(format!("injected failure on {table}")));
        }
        let generated_ids: Vec<Value> = rows
            .iter()
            .map(|_| {
                self.next_id += 1;
                Value::BigInt(self.next_id)
            })
            .collect();
        self.calls.push(Call::Insert {
            table: table.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
            generated_ids: generated_ids.clone(),
        });
        Ok(generated_ids)
    }

    fn execute_batch_update(
        &mut self,
        table: &str,
        key_column: &str,
        set_columns: &[&str],
        rows: Vec<UpdateRow>,
    ) -> Result<u64> {
        let count = rows.len() as u64;
        self.calls.push(Call::Update {
            table: table.to_string(),
            key_column: key_column.to_string(),
            set_columns: set_columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        });
        Ok(count)
    }
}
