//! Update executor implementation.

use crate::access::{RowId, Tuple, Value};
use crate::catalog::{ColumnId, ColumnInfo};
use crate::check::CompiledCheck;
use crate::executor::{count_schema, count_tuple, ExecutionContext, Executor, RowValues};
use crate::expression::{Expression, ExpressionEvaluator};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;

/// A column assignment of an UPDATE: `SET column = value`
#[derive(Debug, Clone)]
pub struct UpdateAssignment {
    /// Ordinal of the assigned column
    pub column: usize,
    /// Evaluated against the row before the update
    pub value: Expression,
}

impl UpdateAssignment {
    pub fn new(column: usize, value: Expression) -> Self {
        Self { column, value }
    }
}

/// Executor for updating the rows produced by its child.
///
/// The new version of each row is checked against the table's CHECK
/// constraints; nothing is written unless every row passes.
pub struct UpdateExecutor {
    table_name: String,
    assignments: Vec<UpdateAssignment>,
    child: Box<dyn Executor>,
    context: ExecutionContext,
    table_columns: Vec<ColumnInfo>,
    /// Every column id -> its ordinal, for loading a full old row
    all_columns: HashMap<ColumnId, usize>,
    /// Assigned column id -> position in the list of new values
    assigned_columns: HashMap<ColumnId, usize>,
    checks: CompiledCheck,
    output_schema: Vec<ColumnInfo>,
    done: bool,
    initialized: bool,
}

impl UpdateExecutor {
    /// Create a new update executor
    pub fn new(
        table_name: String,
        assignments: Vec<UpdateAssignment>,
        child: Box<dyn Executor>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            table_name,
            assignments,
            child,
            context,
            table_columns: Vec::new(),
            all_columns: HashMap::new(),
            assigned_columns: HashMap::new(),
            checks: CompiledCheck::empty(),
            output_schema: count_schema(),
            done: false,
            initialized: false,
        }
    }

    /// Apply the assignments to `old_values` and check the result
    fn apply_updates(&mut self, old_values: &[Value]) -> Result<Vec<Value>> {
        let mut old_row = RowValues::new(self.table_columns.clone());
        old_row.set(old_values.to_vec());
        let evaluator = ExpressionEvaluator::new(&old_row, &self.context.eval_ctx);

        let mut assigned = Vec::with_capacity(self.assignments.len());
        for assignment in &self.assignments {
            let column = &self.table_columns[assignment.column];
            let value = evaluator.evaluate(&assignment.value)?;
            if !value.is_compatible_with(column.data_type) {
                bail!(
                    "Value {} is not compatible with column '{}' of type {}",
                    value,
                    column.name,
                    column.data_type
                );
            }
            assigned.push(value);
        }

        let mut new_values = old_values.to_vec();
        for (assignment, value) in self.assignments.iter().zip(&assigned) {
            new_values[assignment.column] = value.clone();
        }

        // Old row first, then the assigned columns over it
        self.checks.load_row(&self.all_columns, old_values, false);
        self.checks.load_row(&self.assigned_columns, &assigned, true);
        self.checks.check(&self.context.eval_ctx)?;
        Ok(new_values)
    }
}

impl Executor for UpdateExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let table_info = self
            .context
            .catalog
            .get_table(&self.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", self.table_name))?;

        for (i, assignment) in self.assignments.iter().enumerate() {
            let Some(column) = table_info.columns.get(assignment.column) else {
                bail!(
                    "Column index {} is out of bounds for table '{}'",
                    assignment.column,
                    self.table_name
                );
            };
            if self.assignments[..i]
                .iter()
                .any(|other| other.column == assignment.column)
            {
                bail!("Column '{}' assigned more than once", column.name);
            }
        }

        self.child.init()?;
        if self.child.output_schema().len() != table_info.columns.len() {
            bail!("Update input must produce complete rows of '{}'", self.table_name);
        }

        self.all_columns = table_info
            .columns
            .iter()
            .map(|c| (c.id, c.ordinal))
            .collect();
        self.assigned_columns = self
            .assignments
            .iter()
            .enumerate()
            .map(|(pos, a)| (table_info.columns[a.column].id, pos))
            .collect();
        self.checks = CompiledCheck::for_table(&table_info)?;
        self.table_columns = table_info.columns;
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

        // Collect first; the child reads a snapshot of the heap
        let mut updates: Vec<(RowId, Vec<Value>)> = Vec::new();
        while let Some(tuple) = self.child.next()? {
            let new_values = self.apply_updates(&tuple.values)?;
            updates.push((tuple.row_id, new_values));
        }

        let heap = self
            .context
            .catalog
            .heap(&self.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", self.table_name))?;
        let update_count = updates.len();
        {
            let mut heap = heap.write();
            for (row_id, values) in updates {
                heap.update(row_id, values)?;
            }
        }

        log::debug!("updated {} row(s) in '{}'", update_count, self.table_name);
        self.done = true;
        Ok(Some(count_tuple(update_count)))
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}
