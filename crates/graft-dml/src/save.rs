//! The save transaction: walk once, commit in phases.
//!
//! A [`SaveTransaction`] drives one write of one object graph:
//!
//! ```text
//! WALK -> INSERT/UPDATE ROWS -> FIX FOREIGN KEYS -> FIX BACK REFERENCES -> INSERT JOIN ROWS
//! ```
//!
//! Each phase runs across *all* collected batches before the next phase
//! starts. That breadth-across-phases ordering is the correctness core:
//! when phase *k+1* begins for any batch, every batch has finished phase
//! *k*, so any id dependency established in phase *k* is visible in phase
//! *k+1* no matter which type produced it. There is no safe per-type
//! ordering that could replace it - type A's row may need type B's id
//! while type B's row needs type C's.
//!
//! Any error aborts the remaining phases and surfaces to the caller, who
//! owns rollback of the enclosing store-level transaction.

use crate::type_batch::TypeBatch;
use crate::walker::GraphWalker;
use graft_core::{DmlKind, EntityRef, MapperRegistry, Result, Store, Value};

/// One cascading write of one object graph.
///
/// Transactions are cheap to construct and single-use in spirit: all
/// batch state lives in the walker created per [`execute`](Self::execute)
/// call and is discarded when the call returns, success or failure.
pub struct SaveTransaction<'a> {
    registry: &'a MapperRegistry,
    kind: DmlKind,
}

impl<'a> SaveTransaction<'a> {
    /// Create a transaction for the given operation kind.
    #[must_use]
    pub fn new(registry: &'a MapperRegistry, kind: DmlKind) -> Self {
        Self { registry, kind }
    }

    /// The operation kind gating this transaction's cascade edges.
    #[must_use]
    pub fn kind(&self) -> DmlKind {
        self.kind
    }

    /// Persist the graph reachable from `root` and return the root's id.
    ///
    /// The id is read back after the phases complete: populated by the
    /// insert phase for store-generated ids, or already populated by the
    /// caller otherwise.
    #[tracing::instrument(level = "info", skip_all, fields(kind = ?self.kind))]
    pub fn execute<S: Store>(&self, store: &mut S, root: &EntityRef) -> Result<Value> {
        let start = std::time::Instant::now();

        let mut walker = GraphWalker::new(self.registry, self.kind);
        walker.visit(Some(root))?;
        let (mut type_batches, join_batches) = walker.into_batches();

        tracing::debug!(
            types = type_batches.len(),
            rows = type_batches.iter().map(TypeBatch::len).sum::<usize>(),
            join_tables = join_batches.len(),
            "graph walk complete"
        );

        for batch in &mut type_batches {
            batch.execute(store)?;
        }
        for batch in &type_batches {
            batch.fix_foreign_keys(store)?;
        }
        for batch in &type_batches {
            batch.fix_back_references(store)?;
        }
        for batch in &join_batches {
            batch.execute(store)?;
        }

        let root_guard = root.read();
        let mapper = self.registry.mapper_for(root_guard.entity_type())?;
        let id = mapper.id_value(&root_guard);

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            root_id = %id,
            "save complete"
        );
        Ok(id)
    }
}

/// Persist the graph reachable from `root`, following save-cascade edges.
///
/// Returns the root's identifier, generated by the store when the root's
/// type uses store-generated ids.
pub fn save<S: Store>(
    registry: &MapperRegistry,
    store: &mut S,
    root: &EntityRef,
) -> Result<Value> {
    SaveTransaction::new(registry, DmlKind::Save).execute(store, root)
}

/// Write the graph reachable from `root`, following update-cascade edges.
pub fn update<S: Store>(
    registry: &MapperRegistry,
    store: &mut S,
    root: &EntityRef,
) -> Result<Value> {
    SaveTransaction::new(registry, DmlKind::Update).execute(store, root)
}
