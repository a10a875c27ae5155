use crate::access::value::Value;

/// Unique identifier for a row within a table heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u64);

/// Represents a row in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub row_id: RowId,
    pub values: Vec<Value>,
}

impl Tuple {
    pub fn new(row_id: RowId, values: Vec<Value>) -> Self {
        Self { row_id, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_ordering() {
        assert!(RowId(1) < RowId(2));
        assert_eq!(RowId(7), RowId(7));
    }

    #[test]
    fn test_tuple_creation() {
        let tuple = Tuple::new(RowId(3), vec![Value::Int32(1), Value::Null]);
        assert_eq!(tuple.row_id, RowId(3));
        assert_eq!(tuple.values.len(), 2);
    }
}
