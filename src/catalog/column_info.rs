//! Column information and metadata structures.

use crate::access::DataType;
use std::fmt;

/// Stable identifier of a column within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub id: ColumnId,
    pub name: String,
    pub data_type: DataType,
    /// Position of the column in stored rows (0-based)
    pub ordinal: usize,
}

impl ColumnInfo {
    pub fn new(id: ColumnId, name: impl Into<String>, data_type: DataType, ordinal: usize) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            ordinal,
        }
    }

    /// Build a column list from `(name, type)` pairs, numbering ids from 1.
    pub fn from_pairs<S: Into<String>>(pairs: Vec<(S, DataType)>) -> Vec<ColumnInfo> {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (name, data_type))| ColumnInfo::new(ColumnId(i as u32 + 1), name, data_type, i))
            .collect()
    }
}
