//! Per-row evaluation of compiled CHECK constraints.

use crate::access::Value;
use crate::catalog::{ColumnId, TableInfo};
use crate::check::binding::RowBinding;
use crate::check::compiler::compile;
use crate::check::{CheckError, CheckResult};
use crate::expression::{EvalContext, Expression, ExpressionEvaluator, IndexedVar};
use std::collections::HashMap;

/// A compiled CHECK expression together with the text it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    pub expr: Expression,
    pub source: String,
}

/// The CHECK constraints of one table, compiled for one statement.
///
/// Usage is strictly sequential: `load_row` binds a row, `check` evaluates
/// every expression against it, and the next `load_row` replaces it. The
/// mutable borrow taken by `load_row` keeps one instance from serving two
/// statements at once.
#[derive(Debug, Clone)]
pub struct CompiledCheck {
    exprs: Vec<CompiledExpr>,
    binding: Option<RowBinding>,
}

impl CompiledCheck {
    /// A table without CHECK constraints: no buffer, nothing to evaluate
    pub fn empty() -> Self {
        Self {
            exprs: Vec::new(),
            binding: None,
        }
    }

    pub(crate) fn new(exprs: Vec<CompiledExpr>, binding: RowBinding) -> Self {
        Self {
            exprs,
            binding: Some(binding),
        }
    }

    /// Compile every CHECK constraint of `table`
    pub fn for_table(table: &TableInfo) -> CheckResult<Self> {
        let texts: Vec<&str> = table.checks.iter().map(|c| c.expr.as_str()).collect();
        compile(&table.table_name, &table.columns, &texts)
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn exprs(&self) -> &[CompiledExpr] {
        &self.exprs
    }

    /// Current row buffer, `None` when there is nothing to check
    pub fn row_buffer(&self) -> Option<&[Value]> {
        self.binding.as_ref().map(|b| b.row())
    }

    pub fn indexed_vars(&self) -> &[IndexedVar] {
        self.binding
            .as_ref()
            .map(|b| b.indexed_vars())
            .unwrap_or(&[])
    }

    /// Bind the next row. `col_idx` maps column ids to positions in `row`.
    /// Columns missing from the map are set to NULL unless `merge` is set,
    /// in which case they keep the value of the previously loaded row.
    pub fn load_row(&mut self, col_idx: &HashMap<ColumnId, usize>, row: &[Value], merge: bool) {
        if self.exprs.is_empty() {
            return;
        }
        if let Some(binding) = self.binding.as_mut() {
            binding.load(col_idx, row, merge);
        }
    }

    /// Evaluate the expressions in declaration order against the loaded
    /// row. NULL satisfies a constraint; the first FALSE stops evaluation.
    pub fn check(&self, ctx: &EvalContext) -> CheckResult<()> {
        let Some(binding) = self.binding.as_ref() else {
            return Ok(());
        };

        let evaluator = ExpressionEvaluator::new(binding, ctx);
        for compiled in &self.exprs {
            if evaluator.evaluate_predicate(&compiled.expr)? == Some(false) {
                log::debug!(
                    "row {:?} violates CHECK ({})",
                    binding.row(),
                    compiled.source
                );
                return Err(CheckError::ConstraintViolation {
                    expr: compiled.source.clone(),
                });
            }
        }
        Ok(())
    }
}
