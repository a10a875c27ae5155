//! Indexed variables: column references bound to slots of a row supplied at
//! evaluation time by an `IndexedVarContainer`.

use crate::access::{DataType, Value};
use crate::expression::{EvalContext, Expression, ExpressionError, ExpressionResult};
use std::fmt;

/// Read access to the row an expression is evaluated against. Implementors
/// own the row layout; the evaluator only ever sees slot numbers.
pub trait IndexedVarContainer {
    /// Current value of `idx`, evaluated in `ctx`
    fn indexed_var_eval(&self, idx: usize, ctx: &EvalContext) -> ExpressionResult<Value>;

    /// Declared type of the column bound to `idx`
    fn indexed_var_resolved_type(&self, idx: usize) -> DataType;

    /// Display name of the column bound to `idx`
    fn indexed_var_format(&self, f: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result;
}

/// One slot per source column. `slot` is `None` while no expression
/// references the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedVar {
    pub slot: Option<usize>,
}

impl IndexedVar {
    pub fn unreferenced() -> Self {
        Self { slot: None }
    }

    pub fn is_referenced(&self) -> bool {
        self.slot.is_some()
    }
}

/// Hands out indexed variables over a fixed number of columns and remembers
/// which ones were used.
#[derive(Debug, Clone)]
pub struct IndexedVarHelper {
    vars: Vec<IndexedVar>,
}

impl IndexedVarHelper {
    pub fn new(num_vars: usize) -> Self {
        Self {
            vars: vec![IndexedVar::unreferenced(); num_vars],
        }
    }

    /// Bind column `idx`, returning the expression that reads it
    pub fn index_var(&mut self, idx: usize) -> ExpressionResult<Expression> {
        let count = self.vars.len();
        let var = self
            .vars
            .get_mut(idx)
            .ok_or(ExpressionError::IndexedVarOutOfBounds { index: idx, count })?;
        var.slot = Some(idx);
        Ok(Expression::IndexedVar(idx))
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn indexed_vars(&self) -> &[IndexedVar] {
        &self.vars
    }

    pub fn into_indexed_vars(self) -> Vec<IndexedVar> {
        self.vars
    }
}
