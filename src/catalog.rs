//! Table catalog.
//!
//! The catalog owns every table definition together with its row heap.
//! Definitions are handed out as clones so a statement works against a
//! stable copy of the schema and check list for its whole execution.

pub mod column_info;
pub mod table_info;

use crate::access::{DataType, TableHeap};
use anyhow::{bail, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub use column_info::{ColumnId, ColumnInfo};
pub use table_info::{CheckConstraint, ConstraintId, TableId, TableInfo};

struct TableEntry {
    info: TableInfo,
    heap: Arc<RwLock<TableHeap>>,
}

pub struct Catalog {
    tables: DashMap<String, TableEntry>,
    next_table_id: AtomicU32,
    next_constraint_id: AtomicU32,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            next_table_id: AtomicU32::new(1),
            next_constraint_id: AtomicU32::new(1),
        }
    }

    /// Create a new table with the given columns and CHECK expressions
    pub fn create_table(
        &self,
        table_name: &str,
        columns: Vec<(String, DataType)>,
        checks: Vec<(Option<String>, String)>,
    ) -> Result<TableInfo> {
        if columns.is_empty() {
            bail!("Table '{}' must have at least one column", table_name);
        }
        for (i, (name, _)) in columns.iter().enumerate() {
            if columns[..i].iter().any(|(other, _)| other.eq_ignore_ascii_case(name)) {
                bail!("Column '{}' specified more than once", name);
            }
        }

        match self.tables.entry(Self::key(table_name)) {
            Entry::Occupied(_) => bail!("Table '{}' already exists", table_name),
            Entry::Vacant(vacant) => {
                let table_id = TableId(self.next_table_id.fetch_add(1, Ordering::SeqCst));
                let columns = ColumnInfo::from_pairs(columns);
                let checks = checks
                    .into_iter()
                    .map(|(name, expr)| CheckConstraint::new(self.next_constraint_id(), name, expr))
                    .collect();
                let info = TableInfo {
                    table_id,
                    table_name: table_name.to_string(),
                    columns,
                    checks,
                };
                let heap = TableHeap::new(table_id, info.column_types());
                vacant.insert(TableEntry {
                    info: info.clone(),
                    heap: Arc::new(RwLock::new(heap)),
                });
                log::debug!("created table '{}' with id {}", table_name, table_id);
                Ok(info)
            }
        }
    }

    pub fn get_table(&self, table_name: &str) -> Option<TableInfo> {
        self.tables
            .get(&Self::key(table_name))
            .map(|entry| entry.info.clone())
    }

    pub fn heap(&self, table_name: &str) -> Option<Arc<RwLock<TableHeap>>> {
        self.tables
            .get(&Self::key(table_name))
            .map(|entry| entry.heap.clone())
    }

    /// Table names, sorted
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .iter()
            .map(|entry| entry.info.table_name.clone())
            .collect();
        names.sort();
        names
    }

    /// Attach a CHECK constraint to an existing table. Callers are expected
    /// to have validated existing rows beforehand.
    pub fn add_check(
        &self,
        table_name: &str,
        name: Option<String>,
        expr: String,
    ) -> Result<CheckConstraint> {
        let mut entry = match self.tables.get_mut(&Self::key(table_name)) {
            Some(entry) => entry,
            None => bail!("Table '{}' not found", table_name),
        };
        if let Some(ref name) = name {
            if entry
                .info
                .checks
                .iter()
                .any(|c| c.name.as_deref() == Some(name.as_str()))
            {
                bail!(
                    "Constraint '{}' already exists on table '{}'",
                    name,
                    table_name
                );
            }
        }
        let check = CheckConstraint::new(self.next_constraint_id(), name, expr);
        entry.info.checks.push(check.clone());
        Ok(check)
    }

    fn next_constraint_id(&self) -> ConstraintId {
        ConstraintId(self.next_constraint_id.fetch_add(1, Ordering::SeqCst))
    }

    fn key(table_name: &str) -> String {
        table_name.to_ascii_lowercase()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
