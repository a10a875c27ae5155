//! CHECK constraints.
//!
//! Tables declare boolean predicates their rows must satisfy. This module
//! compiles the predicate text of a table into typed expressions bound to a
//! shared row buffer (`compiler`, `binding`), evaluates them for each row a
//! DML statement writes (`row_check`), and validates existing rows when a
//! constraint is added to a populated table (`validator`).
//!
//! A predicate that evaluates to NULL is satisfied. Both per-row checking
//! and validation stop at the first violation.

pub mod binding;
pub mod compiler;
pub mod error;
pub mod row_check;
pub mod validator;

pub use binding::RowBinding;
pub use compiler::compile;
pub use error::{CheckError, CheckResult, RenderedRow};
pub use row_check::{CompiledCheck, CompiledExpr};
pub use validator::validate_check_expr;
