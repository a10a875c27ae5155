//! Access layer for row-oriented operations.
//!
//! This module provides abstractions for managing tables and rows:
//!
//! - **TableHeap**: In-memory row store for a single table
//! - **Tuple**: Individual rows with unique RowIds
//! - **Value**: Type-safe representation of column values
//! - **DataType**: Supported column data types

pub mod heap;
pub mod tuple;
pub mod value;

pub use heap::TableHeap;
pub use tuple::{RowId, Tuple};
pub use value::{DataType, Value};
