//! Row buffer that CHECK expressions read their column values from.

use crate::access::{DataType, Value};
use crate::catalog::{ColumnId, ColumnInfo};
use crate::expression::{
    EvalContext, ExpressionError, ExpressionResult, IndexedVar, IndexedVarContainer,
};
use std::collections::HashMap;
use std::fmt;

/// The row currently under check. Slot `i` holds the value of column `i`;
/// the buffer is sized once from the column list and never resized.
#[derive(Debug, Clone)]
pub struct RowBinding {
    columns: Vec<ColumnInfo>,
    ivars: Vec<IndexedVar>,
    row: Vec<Value>,
}

impl RowBinding {
    /// Binding over `columns` with every slot NULL and unreferenced
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        let width = columns.len();
        Self {
            columns,
            ivars: vec![IndexedVar::unreferenced(); width],
            row: vec![Value::Null; width],
        }
    }

    /// Record which slots the compiled expressions actually read
    pub(crate) fn set_indexed_vars(&mut self, ivars: Vec<IndexedVar>) {
        debug_assert_eq!(ivars.len(), self.row.len());
        self.ivars = ivars;
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn indexed_vars(&self) -> &[IndexedVar] {
        &self.ivars
    }

    pub fn row(&self) -> &[Value] {
        &self.row
    }

    /// Copy the referenced columns of `row` into the buffer. `col_idx` maps a
    /// column id to its position in `row`. An unmapped column becomes NULL,
    /// or keeps its previous value when `merge` is set.
    pub(crate) fn load(&mut self, col_idx: &HashMap<ColumnId, usize>, row: &[Value], merge: bool) {
        for ivar in &self.ivars {
            let Some(slot) = ivar.slot else {
                continue;
            };
            let incoming = col_idx
                .get(&self.columns[slot].id)
                .and_then(|&pos| row.get(pos));
            match incoming {
                Some(value) => self.row[slot] = value.clone(),
                None if !merge => self.row[slot] = Value::Null,
                None => {}
            }
        }
    }
}

impl IndexedVarContainer for RowBinding {
    fn indexed_var_eval(&self, idx: usize, _ctx: &EvalContext) -> ExpressionResult<Value> {
        self.row
            .get(idx)
            .cloned()
            .ok_or(ExpressionError::IndexedVarOutOfBounds {
                index: idx,
                count: self.row.len(),
            })
    }

    fn indexed_var_resolved_type(&self, idx: usize) -> DataType {
        self.columns[idx].data_type
    }

    fn indexed_var_format(&self, f: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result {
        write!(f, "{}", self.columns[idx].name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    fn binding() -> RowBinding {
        RowBinding::new(ColumnInfo::from_pairs(vec![
            ("id", DataType::Int32),
            ("name", DataType::Varchar),
        ]))
    }

    #[test]
    fn test_new_binding_is_null() {
        let binding = binding();
        assert_eq!(binding.row(), &[Value::Null, Value::Null]);
        assert!(binding.indexed_vars().iter().all(|v| !v.is_referenced()));
    }

    #[test]
    fn test_load_only_touches_referenced_slots() {
        let mut binding = binding();
        binding.set_indexed_vars(vec![IndexedVar::unreferenced(), IndexedVar { slot: Some(1) }]);

        let col_idx = HashMap::from([(ColumnId(1), 0), (ColumnId(2), 1)]);
        binding.load(&col_idx, &[Value::Int32(7), Value::String("ann".to_string())], false);
        assert_eq!(
            binding.row(),
            &[Value::Null, Value::String("ann".to_string())]
        );

        binding.load(&HashMap::new(), &[], true);
        assert_eq!(binding.row()[1], Value::String("ann".to_string()));

        binding.load(&HashMap::new(), &[], false);
        assert_eq!(binding.row()[1], Value::Null);
    }

    #[test]
    fn test_container_reads_buffer() -> anyhow::Result<()> {
        let mut binding = binding();
        binding.set_indexed_vars(vec![IndexedVar::unreferenced(), IndexedVar { slot: Some(1) }]);
        binding.load(
            &HashMap::from([(ColumnId(2), 0)]),
            &[Value::String("ann".to_string())],
            false,
        );

        let ctx = EvalContext::default();
        assert_eq!(
            binding.indexed_var_eval(1, &ctx)?,
            Value::String("ann".to_string())
        );
        assert_eq!(binding.indexed_var_resolved_type(1), DataType::Varchar);
        assert!(binding.indexed_var_eval(2, &ctx).is_err());

        let expr = Expression::is_null(Expression::IndexedVar(1));
        assert_eq!(expr.display(&binding).to_string(), "name IS NULL");
        Ok(())
    }
}
