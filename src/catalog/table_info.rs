use crate::access::DataType;
use crate::catalog::column_info::ColumnInfo;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub u32);

/// A CHECK constraint attached to a table definition.
///
/// `expr` holds the canonical source text of the predicate; it is parsed
/// again every time a statement compiles the table's checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    pub id: ConstraintId,
    pub name: Option<String>,
    pub expr: String,
}

impl CheckConstraint {
    pub fn new(id: ConstraintId, name: Option<String>, expr: impl Into<String>) -> Self {
        Self {
            id,
            name,
            expr: expr.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub table_id: TableId,
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
    pub checks: Vec<CheckConstraint>,
}

impl TableInfo {
    /// Find a column position by name (case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    pub fn column_types(&self) -> Vec<DataType> {
        self.columns.iter().map(|col| col.data_type).collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }
}
