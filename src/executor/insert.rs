//! Insert executor implementation.

use crate::access::{Tuple, Value};
use crate::catalog::{ColumnId, ColumnInfo, TableInfo};
use crate::check::CompiledCheck;
use crate::executor::{count_schema, count_tuple, ExecutionContext, Executor, RowValues};
use crate::expression::{Expression, ExpressionEvaluator};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;

/// Executor for inserting rows into a table.
///
/// Every row is evaluated and checked against the table's CHECK
/// constraints before any row is written, so a failing row leaves the
/// table untouched.
pub struct InsertExecutor {
    table_name: String,
    columns: Option<Vec<String>>,
    rows: Vec<Vec<Expression>>,
    context: ExecutionContext,
    table_info: Option<TableInfo>,
    /// Target column id -> position in a supplied row
    col_idx: HashMap<ColumnId, usize>,
    checks: CompiledCheck,
    output_schema: Vec<ColumnInfo>,
    done: bool,
    initialized: bool,
}

impl InsertExecutor {
    /// Create a new insert executor. `columns` names the target columns of
    /// each row; `None` means every column in table order.
    pub fn new(
        table_name: String,
        columns: Option<Vec<String>>,
        rows: Vec<Vec<Expression>>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            table_name,
            columns,
            rows,
            context,
            table_info: None,
            col_idx: HashMap::new(),
            checks: CompiledCheck::empty(),
            output_schema: count_schema(),
            done: false,
            initialized: false,
        }
    }

    fn target_columns(&self, table_info: &TableInfo) -> Result<Vec<usize>> {
        let Some(names) = &self.columns else {
            return Ok((0..table_info.columns.len()).collect());
        };

        let mut ordinals = Vec::with_capacity(names.len());
        for name in names {
            let ordinal = table_info
                .column_index(name)
                .ok_or_else(|| anyhow!("Column '{}' not found in table '{}'", name, self.table_name))?;
            if ordinals.contains(&ordinal) {
                bail!("Column '{}' specified more than once", name);
            }
            ordinals.push(ordinal);
        }
        Ok(ordinals)
    }

    /// Evaluate one row of the VALUES list into a full table row, checking
    /// it against the CHECK constraints on the way.
    fn prepare_row(&mut self, row_num: usize, table_info: &TableInfo) -> Result<Vec<Value>> {
        let constants = RowValues::new(Vec::new());
        let evaluator = ExpressionEvaluator::new(&constants, &self.context.eval_ctx);
        let supplied = self.rows[row_num]
            .iter()
            .map(|expr| evaluator.evaluate(expr))
            .collect::<Result<Vec<_>, _>>()?;

        let mut full_row = vec![Value::Null; table_info.columns.len()];
        for column in &table_info.columns {
            if let Some(&pos) = self.col_idx.get(&column.id) {
                let value = &supplied[pos];
                if !value.is_compatible_with(column.data_type) {
                    bail!(
                        "Row {} column '{}': value {} is not compatible with type {}",
                        row_num,
                        column.name,
                        value,
                        column.data_type
                    );
                }
                full_row[column.ordinal] = value.clone();
            }
        }

        // Unsupplied columns are NULL, so nothing is merged
        self.checks.load_row(&self.col_idx, &supplied, false);
        self.checks.check(&self.context.eval_ctx)?;
        Ok(full_row)
    }
}

impl Executor for InsertExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let table_info = self
            .context
            .catalog
            .get_table(&self.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", self.table_name))?;

        let ordinals = self.target_columns(&table_info)?;
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != ordinals.len() {
                bail!(
                    "Row {} has {} values but {} columns were specified",
                    i,
                    row.len(),
                    ordinals.len()
                );
            }
        }

        self.col_idx = ordinals
            .iter()
            .enumerate()
            .map(|(pos, &ordinal)| (table_info.columns[ordinal].id, pos))
            .collect();
        self.checks = CompiledCheck::for_table(&table_info)?;
        self.table_info = Some(table_info);
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }
        if self.done {
            return Ok(None);
        }

        let table_info = self
            .table_info
            .take()
            .ok_or_else(|| anyhow!("Table info not available"))?;

        let mut prepared = Vec::with_capacity(self.rows.len());
        for row_num in 0..self.rows.len() {
            prepared.push(self.prepare_row(row_num, &table_info)?);
        }

        let heap = self
            .context
            .catalog
            .heap(&self.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", self.table_name))?;
        let insert_count = prepared.len();
        {
            let mut heap = heap.write();
            for row in prepared {
                heap.insert(row)?;
            }
        }

        log::debug!("inserted {} row(s) into '{}'", insert_count, self.table_name);
        self.done = true;
        Ok(Some(count_tuple(insert_count)))
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}
