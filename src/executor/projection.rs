//! Projection executor implementation.
//!
//! This executor projects specific columns from a child executor, allowing for
//! column selection and reordering.

use crate::access::Tuple;
use crate::catalog::ColumnInfo;
use crate::executor::Executor;
use anyhow::{bail, Result};

/// Executor that projects specific columns from child tuples
pub struct ProjectionExecutor {
    /// Child executor that produces tuples
    child: Box<dyn Executor>,
    /// Indices of columns to project from the child's output
    column_indices: Vec<usize>,
    /// Output schema (projected columns)
    output_schema: Vec<ColumnInfo>,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl ProjectionExecutor {
    /// Create a new projection executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces tuples
    /// * `column_indices` - Indices of columns to project from child's output (0-based)
    ///
    /// # Example
    /// ```ignore
    /// // If child produces columns [id, name, age]
    /// // column_indices [2, 0] would produce [age, id]
    /// ```
    pub fn new(child: Box<dyn Executor>, column_indices: Vec<usize>) -> Self {
        Self {
            child,
            column_indices,
            output_schema: Vec::new(),
            initialized: false,
        }
    }
}

impl Executor for ProjectionExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;
        let child_schema = self.child.output_schema();

        for &idx in &self.column_indices {
            if idx >= child_schema.len() {
                bail!(
                    "Column index {} is out of bounds for schema with {} columns",
                    idx,
                    child_schema.len()
                );
            }
        }

        self.output_schema = self
            .column_indices
            .iter()
            .enumerate()
            .map(|(ordinal, &idx)| {
                let mut column = child_schema[idx].clone();
                column.ordinal = ordinal;
                column
            })
            .collect();

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        match self.child.next()? {
            Some(tuple) => {
                let values = self
                    .column_indices
                    .iter()
                    .map(|&idx| tuple.values[idx].clone())
                    .collect();
                Ok(Some(Tuple::new(tuple.row_id, values)))
            }
            None => Ok(None),
        }
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}
