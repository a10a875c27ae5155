use crate::access::tuple::{RowId, Tuple};
use crate::access::value::{DataType, Value};
use crate::catalog::TableId;
use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// In-memory row store for a single table.
///
/// Rows are kept in `RowId` order so that scans are deterministic.
pub struct TableHeap {
    table_id: TableId,
    schema: Vec<DataType>,
    rows: BTreeMap<RowId, Vec<Value>>,
    next_row_id: u64,
}

impl TableHeap {
    pub fn new(table_id: TableId, schema: Vec<DataType>) -> Self {
        Self {
            table_id,
            schema,
            rows: BTreeMap::new(),
            next_row_id: 1,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Insert a full row into the table
    pub fn insert(&mut self, values: Vec<Value>) -> Result<RowId> {
        self.validate(&values)?;
        let row_id = RowId(self.next_row_id);
        self.next_row_id += 1;
        self.rows.insert(row_id, values);
        Ok(row_id)
    }

    /// Replace the contents of an existing row
    pub fn update(&mut self, row_id: RowId, values: Vec<Value>) -> Result<()> {
        self.validate(&values)?;
        match self.rows.get_mut(&row_id) {
            Some(slot) => {
                *slot = values;
                Ok(())
            }
            None => bail!("Row {:?} not found in table {}", row_id, self.table_id),
        }
    }

    pub fn get(&self, row_id: RowId) -> Option<&[Value]> {
        self.rows.get(&row_id).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy every row out of the heap. Scans work on this copy so they never
    /// hold the heap lock while evaluating expressions.
    pub fn snapshot(&self) -> Vec<Tuple> {
        self.rows
            .iter()
            .map(|(row_id, values)| Tuple::new(*row_id, values.clone()))
            .collect()
    }

    fn validate(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.schema.len() {
            bail!(
                "Row has {} values but table has {} columns",
                values.len(),
                self.schema.len()
            );
        }
        for (i, (value, expected_type)) in values.iter().zip(self.schema.iter()).enumerate() {
            if !value.is_compatible_with(*expected_type) {
                bail!(
                    "Column {}: value {} is not compatible with type {}",
                    i,
                    value,
                    expected_type
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_heap() -> TableHeap {
        TableHeap::new(TableId(1), vec![DataType::Int32, DataType::Varchar])
    }

    #[test]
    fn test_insert_and_get() -> Result<()> {
        let mut heap = test_heap();
        let id1 = heap.insert(vec![Value::Int32(1), Value::String("a".to_string())])?;
        let id2 = heap.insert(vec![Value::Int32(2), Value::Null])?;

        assert!(id1 < id2);
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.get(id2), Some(&[Value::Int32(2), Value::Null][..]));
        Ok(())
    }

    #[test]
    fn test_insert_rejects_bad_rows() {
        let mut heap = test_heap();
        assert!(heap.insert(vec![Value::Int32(1)]).is_err());
        assert!(heap
            .insert(vec![Value::String("x".to_string()), Value::Null])
            .is_err());
        assert!(heap.is_empty());
    }

    #[test]
    fn test_update() -> Result<()> {
        let mut heap = test_heap();
        let id = heap.insert(vec![Value::Int32(1), Value::Null])?;
        heap.update(id, vec![Value::Int32(5), Value::String("b".to_string())])?;
        assert_eq!(heap.get(id).map(|v| v[0].clone()), Some(Value::Int32(5)));

        assert!(heap.update(RowId(99), vec![Value::Int32(1), Value::Null]).is_err());
        Ok(())
    }

    #[test]
    fn test_snapshot_is_ordered_copy() -> Result<()> {
        let mut heap = test_heap();
        for i in 0..3 {
            heap.insert(vec![Value::Int32(i), Value::Null])?;
        }
        let snapshot = heap.snapshot();
        heap.insert(vec![Value::Int32(10), Value::Null])?;

        assert_eq!(snapshot.len(), 3);
        let ids: Vec<_> = snapshot.iter().map(|t| t.row_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        Ok(())
    }
}
