//! Expression evaluation framework.
//!
//! This module provides:
//! - Typed expression trees whose column references are indexed variables
//! - Analysis of parsed SQL expressions against a table's columns
//! - Type checking driven by the row container
//! - Three-valued evaluation against any `IndexedVarContainer`

pub mod analyzer;
pub mod error;
pub mod eval;
pub mod expr;
pub mod indexed_var;
pub mod operator;
pub mod type_checker;

pub use analyzer::ExpressionAnalyzer;
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate_expression, EvalContext, ExpressionEvaluator};
pub use expr::Expression;
pub use indexed_var::{IndexedVar, IndexedVarContainer, IndexedVarHelper};
pub use operator::{BinaryOperator, UnaryOperator};
pub use type_checker::{type_check_expression, TypeChecker};
