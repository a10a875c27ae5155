//! Typed expression trees.

use crate::access::Value;
use crate::expression::indexed_var::IndexedVarContainer;
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use std::collections::BTreeSet;
use std::fmt;

/// Expression tree node. Column references are resolved to indexed
/// variables, so a tree only evaluates against an `IndexedVarContainer`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal constant value
    Literal(Value),

    /// Slot in the row bound by the evaluating container
    IndexedVar(usize),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a unary operation expression
    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Or, left, right)
    }

    pub fn not_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    pub fn is_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNull, operand)
    }

    /// Check if this expression is a constant (contains no indexed variables)
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::IndexedVar(_) => false,
            Expression::BinaryOp { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::UnaryOp { operand, .. } => operand.is_constant(),
        }
    }

    /// Slots referenced anywhere in the tree, in ascending order
    pub fn referenced_vars(&self) -> BTreeSet<usize> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut BTreeSet<usize>) {
        match self {
            Expression::Literal(_) => {}
            Expression::IndexedVar(idx) => {
                vars.insert(*idx);
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_vars(vars);
                right.collect_vars(vars);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_vars(vars),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expression::BinaryOp { .. } | Expression::UnaryOp { .. }
        )
    }

    /// Render the tree with indexed variables named by `container`
    pub fn display<'a, C>(&'a self, container: &'a C) -> ExpressionDisplay<'a, C>
    where
        C: IndexedVarContainer + ?Sized,
    {
        ExpressionDisplay {
            expr: self,
            container,
        }
    }
}

pub struct ExpressionDisplay<'a, C: ?Sized> {
    expr: &'a Expression,
    container: &'a C,
}

impl<C: IndexedVarContainer + ?Sized> ExpressionDisplay<'_, C> {
    fn operand(&self, expr: &Expression, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = expr.display(self.container);
        if expr.is_compound() {
            write!(f, "({})", inner)
        } else {
            write!(f, "{}", inner)
        }
    }
}

impl<C: IndexedVarContainer + ?Sized> fmt::Display for ExpressionDisplay<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::IndexedVar(idx) => self.container.indexed_var_format(f, *idx),
            Expression::BinaryOp { op, left, right } => {
                self.operand(left, f)?;
                write!(f, " {} ", op.as_str())?;
                self.operand(right, f)
            }
            Expression::UnaryOp { op, operand } if op.is_postfix() => {
                self.operand(operand, f)?;
                write!(f, " {}", op.as_str())
            }
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => {
                write!(f, "NOT ")?;
                self.operand(operand, f)
            }
            Expression::UnaryOp { op, operand } => {
                write!(f, "{}", op.as_str())?;
                self.operand(operand, f)
            }
        }
    }
}
