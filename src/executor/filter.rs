//! Filter executor implementation.
//!
//! This executor filters tuples from a child executor based on a predicate
//! expression. Only rows for which the predicate is TRUE pass; FALSE and
//! NULL both drop the row.

use crate::access::{DataType, Tuple, Value};
use crate::catalog::ColumnInfo;
use crate::executor::Executor;
use crate::expression::{
    EvalContext, Expression, ExpressionError, ExpressionEvaluator, ExpressionResult,
    IndexedVarContainer, TypeChecker,
};
use anyhow::{bail, Result};
use std::fmt;

/// A row flowing through the executor, readable by expressions. Slot `i`
/// is column `i` of `columns`.
#[derive(Debug, Clone)]
pub struct RowValues {
    columns: Vec<ColumnInfo>,
    values: Vec<Value>,
}

impl RowValues {
    /// Container over `columns` holding an all-NULL row
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        let values = vec![Value::Null; columns.len()];
        Self { columns, values }
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn set(&mut self, values: Vec<Value>) {
        self.values = values;
    }
}

impl IndexedVarContainer for RowValues {
    fn indexed_var_eval(&self, idx: usize, _ctx: &EvalContext) -> ExpressionResult<Value> {
        self.values
            .get(idx)
            .cloned()
            .ok_or(ExpressionError::IndexedVarOutOfBounds {
                index: idx,
                count: self.values.len(),
            })
    }

    fn indexed_var_resolved_type(&self, idx: usize) -> DataType {
        self.columns[idx].data_type
    }

    fn indexed_var_format(&self, f: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result {
        write!(f, "{}", self.columns[idx].name)
    }
}

/// Executor that filters tuples based on an expression
pub struct FilterExecutor {
    /// Child executor that produces tuples
    child: Box<dyn Executor>,
    /// Filter expression that evaluates to boolean
    filter_expr: Expression,
    /// Current row, bound for the filter expression
    row: RowValues,
    eval_ctx: EvalContext,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl FilterExecutor {
    /// Create a new filter executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces tuples
    /// * `filter_expr` - The filter expression that evaluates to boolean
    /// * `eval_ctx` - Context of the statement being executed
    pub fn new(child: Box<dyn Executor>, filter_expr: Expression, eval_ctx: EvalContext) -> Self {
        Self {
            child,
            filter_expr,
            row: RowValues::new(Vec::new()),
            eval_ctx,
            initialized: false,
        }
    }
}

impl Executor for FilterExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;
        self.row = RowValues::new(self.child.output_schema().to_vec());

        // Type check the filter expression against the child's columns
        TypeChecker::new(&self.row).check_filter_predicate(&self.filter_expr)?;

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        // Keep getting tuples from child until we find one that matches the predicate
        while let Some(tuple) = self.child.next()? {
            self.row.set(tuple.values.clone());

            let evaluator = ExpressionEvaluator::new(&self.row, &self.eval_ctx);
            if evaluator.evaluate_predicate(&self.filter_expr)? == Some(true) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.row.columns()
    }
}
