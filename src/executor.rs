//! Executor layer for query execution.
//!
//! This module implements the Volcano-style iterator model for executing
//! physical query plans. Each executor produces tuples one at a time via
//! the `next()` method. DML executors produce a single tuple holding the
//! number of affected rows.

use crate::access::{DataType, RowId, Tuple, Value};
use crate::catalog::{Catalog, ColumnId, ColumnInfo};
use crate::expression::EvalContext;
use anyhow::Result;
use std::sync::Arc;

pub mod filter;
pub mod insert;
pub mod limit;
pub mod projection;
pub mod seq_scan;
pub mod update;

// Re-export executors
pub use filter::{FilterExecutor, RowValues};
pub use insert::InsertExecutor;
pub use limit::LimitExecutor;
pub use projection::ProjectionExecutor;
pub use seq_scan::SeqScanExecutor;
pub use update::{UpdateAssignment, UpdateExecutor};

/// Trait for all query executors
pub trait Executor: Send {
    /// Initialize the executor. This must be called before `next()`.
    fn init(&mut self) -> Result<()>;

    /// Get the next tuple from the executor.
    /// Returns None when there are no more tuples.
    fn next(&mut self) -> Result<Option<Tuple>>;

    /// Get the output schema of this executor
    fn output_schema(&self) -> &[ColumnInfo];
}

/// Execution context containing shared resources
#[derive(Clone)]
pub struct ExecutionContext {
    pub catalog: Arc<Catalog>,
    pub eval_ctx: EvalContext,
}

impl ExecutionContext {
    pub fn new(catalog: Arc<Catalog>, eval_ctx: EvalContext) -> Self {
        Self { catalog, eval_ctx }
    }
}

/// Output schema shared by the DML executors
pub(crate) fn count_schema() -> Vec<ColumnInfo> {
    vec![ColumnInfo::new(ColumnId(1), "count", DataType::Int32, 0)]
}

/// Result tuple of a DML executor
pub(crate) fn count_tuple(count: usize) -> Tuple {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    Tuple::new(RowId(0), vec![Value::Int32(count)])
}
