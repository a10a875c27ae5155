//! CHECK constraint error types.

use crate::access::Value;
use crate::expression::ExpressionError;
use std::fmt;
use thiserror::Error;

/// Errors raised while compiling, evaluating or validating CHECK constraints.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Type(String),

    #[error("failed to satisfy CHECK constraint ({expr})")]
    ConstraintViolation { expr: String },

    #[error("validation of CHECK \"{expr}\" failed on row: {row}")]
    Validation { expr: String, row: RenderedRow },

    #[error(transparent)]
    Evaluation(#[from] ExpressionError),

    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

/// Result type for CHECK constraint operations.
pub type CheckResult<T> = Result<T, CheckError>;

/// A row rendered as `column=value` pairs for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow(pub Vec<(String, Value)>);

impl RenderedRow {
    pub fn new(names: &[String], values: &[Value]) -> Self {
        Self(
            names
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }
}

impl fmt::Display for RenderedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
