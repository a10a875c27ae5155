//! Type checking for expressions.

use crate::access::DataType;
use crate::expression::{
    Expression, ExpressionError, ExpressionResult, IndexedVarContainer, UnaryOperator,
};

/// Type checker for expressions. Indexed variable types come from the
/// container the expression will later be evaluated against.
pub struct TypeChecker<'a, C: IndexedVarContainer + ?Sized> {
    container: &'a C,
}

impl<'a, C: IndexedVarContainer + ?Sized> TypeChecker<'a, C> {
    pub fn new(container: &'a C) -> Self {
        Self { container }
    }

    /// Type check an expression and return its output type. `None` is the
    /// type of an untyped NULL.
    pub fn check(&self, expr: &Expression) -> ExpressionResult<Option<DataType>> {
        match expr {
            Expression::Literal(value) => Ok(value.data_type()),

            Expression::IndexedVar(idx) => Ok(Some(self.container.indexed_var_resolved_type(*idx))),

            Expression::BinaryOp { op, left, right } => {
                let left_type = self.check(left)?;
                let right_type = self.check(right)?;

                let output = match (left_type, right_type) {
                    (Some(lt), Some(rt)) => op.output_type(lt, rt),
                    (Some(known), None) | (None, Some(known)) => {
                        op.output_type_with_null(Some(known))
                    }
                    (None, None) => op.output_type_with_null(None),
                };

                match output {
                    Some(output_type) => Ok(Some(output_type)),
                    None => Err(ExpressionError::InvalidOperandTypes {
                        operator: op.as_str().to_string(),
                        left_type,
                        right_type,
                    }),
                }
            }

            Expression::UnaryOp { op, operand } => match self.check(operand)? {
                Some(ot) => match op.output_type(ot) {
                    Some(output_type) => Ok(Some(output_type)),
                    None => Err(ExpressionError::InvalidOperandTypes {
                        operator: op.as_str().to_string(),
                        left_type: Some(ot),
                        right_type: None,
                    }),
                },
                // NULL operand: the operator still fixes the result type
                None => Ok(match op {
                    UnaryOperator::Not | UnaryOperator::IsNull | UnaryOperator::IsNotNull => {
                        Some(DataType::Boolean)
                    }
                    _ => Some(DataType::Int32),
                }),
            },
        }
    }

    /// Check that an expression produces `expected` (or an untyped NULL)
    pub fn check_expected(
        &self,
        expr: &Expression,
        expected: DataType,
        context: &str,
    ) -> ExpressionResult<()> {
        match self.check(expr)? {
            Some(actual) if actual != expected => Err(ExpressionError::TypeMismatch {
                expected,
                actual,
                context: context.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Check if an expression is valid for use as a filter predicate
    pub fn check_filter_predicate(&self, expr: &Expression) -> ExpressionResult<()> {
        self.check_expected(expr, DataType::Boolean, "filter predicate")
    }
}

/// Helper function to type check an expression
pub fn type_check_expression<C: IndexedVarContainer + ?Sized>(
    expr: &Expression,
    container: &C,
) -> ExpressionResult<Option<DataType>> {
    TypeChecker::new(container).check(expr)
}
