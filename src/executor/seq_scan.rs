//! Sequential scan executor implementation.

use crate::access::Tuple;
use crate::catalog::ColumnInfo;
use crate::executor::{ExecutionContext, Executor};
use anyhow::{anyhow, bail, Result};
use std::vec::IntoIter;

/// Executor for sequential table scans.
///
/// The heap is copied when the executor is initialized, so the scan sees the
/// rows that existed at that point and never blocks writers while the rest
/// of the plan runs.
pub struct SeqScanExecutor {
    table_name: String,
    context: ExecutionContext,
    rows: Option<IntoIter<Tuple>>,
    output_schema: Vec<ColumnInfo>,
    initialized: bool,
}

impl SeqScanExecutor {
    /// Create a new sequential scan executor
    pub fn new(table_name: String, context: ExecutionContext) -> Self {
        Self {
            table_name,
            context,
            rows: None,
            output_schema: Vec::new(),
            initialized: false,
        }
    }
}

impl Executor for SeqScanExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let table_info = self
            .context
            .catalog
            .get_table(&self.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", self.table_name))?;
        let heap = self
            .context
            .catalog
            .heap(&self.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", self.table_name))?;

        let snapshot = heap.read().snapshot();
        log::debug!(
            "seq scan of '{}' over {} rows",
            self.table_name,
            snapshot.len()
        );

        self.output_schema = table_info.columns;
        self.rows = Some(snapshot.into_iter());
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        let rows = self
            .rows
            .as_mut()
            .ok_or_else(|| anyhow!("Scan not available"))?;
        Ok(rows.next())
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        &self.output_schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{DataType, Value};
    use crate::catalog::Catalog;
    use crate::expression::EvalContext;
    use std::sync::Arc;

    fn context_with_rows(rows: Vec<Vec<Value>>) -> Result<ExecutionContext> {
        let catalog = Arc::new(Catalog::new());
        catalog.create_table(
            "people",
            vec![
                ("id".to_string(), DataType::Int32),
                ("age".to_string(), DataType::Int32),
            ],
            vec![],
        )?;
        let heap = catalog
            .heap("people")
            .ok_or_else(|| anyhow!("missing heap"))?;
        for row in rows {
            heap.write().insert(row)?;
        }
        Ok(ExecutionContext::new(catalog, EvalContext::default()))
    }

    #[test]
    fn test_seq_scan_returns_rows_in_order() -> Result<()> {
        let context = context_with_rows(vec![
            vec![Value::Int32(1), Value::Int32(5)],
            vec![Value::Int32(2), Value::Null],
        ])?;
        let mut scan = SeqScanExecutor::new("people".to_string(), context);
        scan.init()?;

        assert_eq!(scan.output_schema().len(), 2);
        let first = scan.next()?.expect("first row");
        assert_eq!(first.values, vec![Value::Int32(1), Value::Int32(5)]);
        let second = scan.next()?.expect("second row");
        assert_eq!(second.values[1], Value::Null);
        assert!(scan.next()?.is_none());
        Ok(())
    }

    #[test]
    fn test_seq_scan_sees_snapshot() -> Result<()> {
        let context = context_with_rows(vec![vec![Value::Int32(1), Value::Int32(5)]])?;
        let catalog = context.catalog.clone();
        let mut scan = SeqScanExecutor::new("people".to_string(), context);
        scan.init()?;

        if let Some(heap) = catalog.heap("people") {
            heap.write().insert(vec![Value::Int32(2), Value::Int32(6)])?;
        }

        assert!(scan.next()?.is_some());
        assert!(scan.next()?.is_none());
        Ok(())
    }

    #[test]
    fn test_seq_scan_errors() -> Result<()> {
        let context = context_with_rows(vec![])?;
        let mut scan = SeqScanExecutor::new("missing".to_string(), context.clone());
        assert!(scan.init().is_err());

        let mut scan = SeqScanExecutor::new("people".to_string(), context);
        assert!(scan.next().is_err());
        Ok(())
    }
}
