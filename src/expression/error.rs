//! Error types for expression analysis and evaluation.

use crate::access::DataType;
use std::fmt;

/// Errors that can occur during expression analysis or evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Type mismatch in operation
    TypeMismatch {
        expected: DataType,
        actual: DataType,
        context: String,
    },

    /// Invalid operand types for operator
    InvalidOperandTypes {
        operator: String,
        left_type: Option<DataType>,
        right_type: Option<DataType>,
    },

    /// Column name that does not resolve against the source columns
    UnknownColumn { name: String },

    /// Indexed variable outside the bound row
    IndexedVarOutOfBounds { index: usize, count: usize },

    /// Division or modulo by zero
    DivisionByZero,

    /// Arithmetic result does not fit the integer type
    NumericOverflow { operator: String },

    /// Generic evaluation error
    EvaluationError { message: String },
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::TypeMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Type mismatch in {}: expected {}, got {}",
                    context, expected, actual
                )
            }

            ExpressionError::InvalidOperandTypes {
                operator,
                left_type,
                right_type,
            } => {
                write!(
                    f,
                    "Invalid operand types for operator {}: left={:?}, right={:?}",
                    operator, left_type, right_type
                )
            }

            ExpressionError::UnknownColumn { name } => {
                write!(f, "column \"{}\" does not exist", name)
            }

            ExpressionError::IndexedVarOutOfBounds { index, count } => {
                write!(
                    f,
                    "Indexed variable {} out of bounds for row with {} columns",
                    index, count
                )
            }

            ExpressionError::DivisionByZero => write!(f, "Division by zero"),

            ExpressionError::NumericOverflow { operator } => {
                write!(f, "Integer out of range in operator {}", operator)
            }

            ExpressionError::EvaluationError { message } => {
                write!(f, "Expression evaluation error: {}", message)
            }
        }
    }
}

impl std::error::Error for ExpressionError {}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
