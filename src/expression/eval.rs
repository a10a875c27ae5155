//! Expression evaluation implementation.

use crate::access::{DataType, Value};
use crate::expression::{
    BinaryOperator, Expression, ExpressionError, ExpressionResult, IndexedVarContainer,
    UnaryOperator,
};

/// Ambient state handed to every evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalContext {
    /// Logical time of the statement being executed
    pub statement_timestamp: u64,
}

impl EvalContext {
    pub fn new(statement_timestamp: u64) -> Self {
        Self {
            statement_timestamp,
        }
    }
}

/// Evaluator for expressions over the row bound by `container`
pub struct ExpressionEvaluator<'a, C: IndexedVarContainer + ?Sized> {
    container: &'a C,
    ctx: &'a EvalContext,
}

impl<'a, C: IndexedVarContainer + ?Sized> ExpressionEvaluator<'a, C> {
    pub fn new(container: &'a C, ctx: &'a EvalContext) -> Self {
        Self { container, ctx }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::IndexedVar(idx) => self.container.indexed_var_eval(*idx, self.ctx),

            Expression::BinaryOp { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_binary_op(*op, left_val, right_val)
            }

            Expression::UnaryOp { op, operand } => {
                let operand_val = self.evaluate(operand)?;
                self.evaluate_unary_op(*op, operand_val)
            }
        }
    }

    /// Evaluate a boolean expression. `None` is the unknown truth value.
    pub fn evaluate_predicate(&self, expr: &Expression) -> ExpressionResult<Option<bool>> {
        match self.evaluate(expr)? {
            Value::Null => Ok(None),
            Value::Boolean(b) => Ok(Some(b)),
            other => Err(ExpressionError::TypeMismatch {
                expected: DataType::Boolean,
                // data_type() is only None for NULL, handled above
                actual: other.data_type().unwrap_or(DataType::Boolean),
                context: "predicate".to_string(),
            }),
        }
    }

    /// Evaluate a binary operation
    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: Value,
        right: Value,
    ) -> ExpressionResult<Value> {
        // Handle NULL propagation for most operators
        if left.is_null() || right.is_null() {
            return Ok(match op {
                // NULL AND false = false, NULL AND true = NULL
                BinaryOperator::And => match (&left, &right) {
                    (Value::Boolean(false), _) | (_, Value::Boolean(false)) => {
                        Value::Boolean(false)
                    }
                    _ => Value::Null,
                },
                // NULL OR true = true, NULL OR false = NULL
                BinaryOperator::Or => match (&left, &right) {
                    (Value::Boolean(true), _) | (_, Value::Boolean(true)) => Value::Boolean(true),
                    _ => Value::Null,
                },
                // Comparisons and arithmetic propagate NULL
                _ => Value::Null,
            });
        }

        match op {
            BinaryOperator::Add => self.arithmetic(op, &left, &right, i32::checked_add),
            BinaryOperator::Sub => self.arithmetic(op, &left, &right, i32::checked_sub),
            BinaryOperator::Mul => self.arithmetic(op, &left, &right, i32::checked_mul),
            BinaryOperator::Div | BinaryOperator::Mod => {
                if right == Value::Int32(0) {
                    return Err(ExpressionError::DivisionByZero);
                }
                if op == BinaryOperator::Div {
                    self.arithmetic(op, &left, &right, i32::checked_div)
                } else {
                    self.arithmetic(op, &left, &right, i32::checked_rem)
                }
            }

            BinaryOperator::Eq => self.compare_values(left, right, |cmp| cmp.is_eq()),
            BinaryOperator::Ne => self.compare_values(left, right, |cmp| cmp.is_ne()),
            BinaryOperator::Lt => self.compare_values(left, right, |cmp| cmp.is_lt()),
            BinaryOperator::Le => self.compare_values(left, right, |cmp| cmp.is_le()),
            BinaryOperator::Gt => self.compare_values(left, right, |cmp| cmp.is_gt()),
            BinaryOperator::Ge => self.compare_values(left, right, |cmp| cmp.is_ge()),

            BinaryOperator::And => match (&left, &right) {
                (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
                _ => Err(invalid_operands(op, &left, &right)),
            },

            BinaryOperator::Or => match (&left, &right) {
                (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a || *b)),
                _ => Err(invalid_operands(op, &left, &right)),
            },

            BinaryOperator::Concat => match (&left, &right) {
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
                _ => Err(invalid_operands(op, &left, &right)),
            },
        }
    }

    fn arithmetic<F>(
        &self,
        op: BinaryOperator,
        left: &Value,
        right: &Value,
        apply: F,
    ) -> ExpressionResult<Value>
    where
        F: FnOnce(i32, i32) -> Option<i32>,
    {
        match (left, right) {
            (Value::Int32(a), Value::Int32(b)) => apply(*a, *b).map(Value::Int32).ok_or_else(|| {
                ExpressionError::NumericOverflow {
                    operator: op.as_str().to_string(),
                }
            }),
            _ => Err(invalid_operands(op, left, right)),
        }
    }

    /// Evaluate a unary operation
    fn evaluate_unary_op(&self, op: UnaryOperator, operand: Value) -> ExpressionResult<Value> {
        match op {
            UnaryOperator::Not => match operand {
                Value::Null => Ok(Value::Null),
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                _ => Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left_type: operand.data_type(),
                    right_type: None,
                }),
            },

            UnaryOperator::IsNull => Ok(Value::Boolean(operand.is_null())),

            UnaryOperator::IsNotNull => Ok(Value::Boolean(!operand.is_null())),

            UnaryOperator::Plus => match operand {
                Value::Null => Ok(Value::Null),
                Value::Int32(n) => Ok(Value::Int32(n)),
                _ => Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left_type: operand.data_type(),
                    right_type: None,
                }),
            },

            UnaryOperator::Minus => match operand {
                Value::Null => Ok(Value::Null),
                Value::Int32(n) => n
                    .checked_neg()
                    .map(Value::Int32)
                    .ok_or_else(|| ExpressionError::NumericOverflow {
                        operator: op.as_str().to_string(),
                    }),
                _ => Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left_type: operand.data_type(),
                    right_type: None,
                }),
            },
        }
    }

    /// Compare two values and apply a comparison function
    fn compare_values<F>(&self, left: Value, right: Value, cmp_fn: F) -> ExpressionResult<Value>
    where
        F: FnOnce(std::cmp::Ordering) -> bool,
    {
        let cmp_result = match (&left, &right) {
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => {
                return Err(ExpressionError::InvalidOperandTypes {
                    operator: "comparison".to_string(),
                    left_type: left.data_type(),
                    right_type: right.data_type(),
                })
            }
        };

        Ok(Value::Boolean(cmp_fn(cmp_result)))
    }
}

fn invalid_operands(op: BinaryOperator, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::InvalidOperandTypes {
        operator: op.as_str().to_string(),
        left_type: left.data_type(),
        right_type: right.data_type(),
    }
}

/// Evaluate `expr` against the row bound by `container`
pub fn evaluate_expression<C: IndexedVarContainer + ?Sized>(
    expr: &Expression,
    container: &C,
    ctx: &EvalContext,
) -> ExpressionResult<Value> {
    ExpressionEvaluator::new(container, ctx).evaluate(expr)
}
