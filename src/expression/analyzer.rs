//! Semantic analysis: resolves column names in a parsed SQL expression to
//! indexed variables and produces a type-checked expression tree.

use crate::access::{DataType, Value};
use crate::catalog::ColumnInfo;
use crate::expression::{
    BinaryOperator, Expression, ExpressionError, ExpressionResult, IndexedVarContainer,
    IndexedVarHelper, TypeChecker, UnaryOperator,
};
use crate::sql::ast;

/// Analyzer over the columns of a single table. Column `i` of `columns`
/// becomes indexed variable `i`.
pub struct ExpressionAnalyzer<'a> {
    columns: &'a [ColumnInfo],
    table_name: &'a str,
}

impl<'a> ExpressionAnalyzer<'a> {
    pub fn new(columns: &'a [ColumnInfo], table_name: &'a str) -> Self {
        Self {
            columns,
            table_name,
        }
    }

    /// Resolve and type check `expr`. Column references are bound through
    /// `helper`; their types come from `container`. The result must have
    /// type `expected` or be an untyped NULL.
    pub fn analyze<C: IndexedVarContainer + ?Sized>(
        &self,
        expr: &ast::Expression,
        helper: &mut IndexedVarHelper,
        container: &C,
        expected: DataType,
    ) -> ExpressionResult<Expression> {
        let typed = self.resolve(expr, helper)?;
        TypeChecker::new(container).check_expected(&typed, expected, "expression")?;
        Ok(typed)
    }

    fn resolve(
        &self,
        expr: &ast::Expression,
        helper: &mut IndexedVarHelper,
    ) -> ExpressionResult<Expression> {
        match expr {
            ast::Expression::Literal(value) => Ok(Expression::Literal(value.clone())),

            ast::Expression::Null => Ok(Expression::Literal(Value::Null)),

            ast::Expression::Column(name) => {
                let idx = self.column_index(name)?;
                helper.index_var(idx)
            }

            ast::Expression::QualifiedColumn(table, name) => {
                if !table.eq_ignore_ascii_case(self.table_name) {
                    return Err(ExpressionError::UnknownColumn {
                        name: format!("{}.{}", table, name),
                    });
                }
                let idx = self.column_index(name)?;
                helper.index_var(idx)
            }

            ast::Expression::BinaryOp { left, op, right } => Ok(Expression::binary_op(
                BinaryOperator::from(*op),
                self.resolve(left, helper)?,
                self.resolve(right, helper)?,
            )),

            ast::Expression::UnaryOp { op, operand } => {
                let op = match op {
                    ast::UnaryOperator::Not => UnaryOperator::Not,
                    ast::UnaryOperator::Minus => UnaryOperator::Minus,
                    ast::UnaryOperator::Plus => UnaryOperator::Plus,
                };
                Ok(Expression::unary_op(op, self.resolve(operand, helper)?))
            }

            ast::Expression::IsNull {
                expression,
                negated,
            } => {
                let op = if *negated {
                    UnaryOperator::IsNotNull
                } else {
                    UnaryOperator::IsNull
                };
                Ok(Expression::unary_op(op, self.resolve(expression, helper)?))
            }

            // x IN (a, b) => x = a OR x = b
            ast::Expression::InList {
                expression,
                list,
                negated,
            } => {
                let target = self.resolve(expression, helper)?;
                let mut lowered: Option<Expression> = None;
                for item in list {
                    let eq = Expression::eq(target.clone(), self.resolve(item, helper)?);
                    lowered = Some(match lowered {
                        Some(acc) => Expression::or(acc, eq),
                        None => eq,
                    });
                }
                let lowered = lowered.ok_or_else(|| ExpressionError::EvaluationError {
                    message: "IN list must not be empty".to_string(),
                })?;
                Ok(negate_if(lowered, *negated))
            }

            // x BETWEEN a AND b => x >= a AND x <= b
            ast::Expression::Between {
                expression,
                low,
                high,
                negated,
            } => {
                let target = self.resolve(expression, helper)?;
                let lowered = Expression::and(
                    Expression::binary_op(
                        BinaryOperator::Ge,
                        target.clone(),
                        self.resolve(low, helper)?,
                    ),
                    Expression::binary_op(BinaryOperator::Le, target, self.resolve(high, helper)?),
                );
                Ok(negate_if(lowered, *negated))
            }
        }
    }

    fn column_index(&self, name: &str) -> ExpressionResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ExpressionError::UnknownColumn {
                name: name.to_string(),
            })
    }
}

fn negate_if(expr: Expression, negated: bool) -> Expression {
    if negated {
        Expression::not_expr(expr)
    } else {
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnInfo;
    use crate::expression::{evaluate_expression, EvalContext};
    use crate::sql::Parser;
    use std::fmt;

    struct Row<'a> {
        columns: &'a [ColumnInfo],
        values: Vec<Value>,
    }

    impl IndexedVarContainer for Row<'_> {
        fn indexed_var_eval(&self, idx: usize, _ctx: &EvalContext) -> ExpressionResult<Value> {
            Ok(self.values[idx].clone())
        }

        fn indexed_var_resolved_type(&self, idx: usize) -> DataType {
            self.columns[idx].data_type
        }

        fn indexed_var_format(&self, f: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result {
            write!(f, "{}", self.columns[idx].name)
        }
    }

    fn columns() -> Vec<ColumnInfo> {
        ColumnInfo::from_pairs(vec![
            ("id", DataType::Int32),
            ("name", DataType::Varchar),
            ("age", DataType::Int32),
        ])
    }

    fn analyze(
        text: &str,
        columns: &[ColumnInfo],
        helper: &mut IndexedVarHelper,
    ) -> anyhow::Result<Expression> {
        let ast = Parser::parse_expression_text(text)?;
        let row = Row {
            columns,
            values: vec![],
        };
        let analyzer = ExpressionAnalyzer::new(columns, "people");
        Ok(analyzer.analyze(&ast, helper, &row, DataType::Boolean)?)
    }

    #[test]
    fn test_resolves_columns_to_indexed_vars() -> anyhow::Result<()> {
        let columns = columns();
        let mut helper = IndexedVarHelper::new(columns.len());
        let expr = analyze("AGE > 0 AND people.id <> 7", &columns, &mut helper)?;

        assert_eq!(
            expr,
            Expression::and(
                Expression::gt(Expression::IndexedVar(2), Expression::literal(Value::Int32(0))),
                Expression::binary_op(
                    BinaryOperator::Ne,
                    Expression::IndexedVar(0),
                    Expression::literal(Value::Int32(7))
                ),
            )
        );

        let referenced: Vec<bool> = helper
            .indexed_vars()
            .iter()
            .map(|v| v.is_referenced())
            .collect();
        assert_eq!(referenced, vec![true, false, true]);
        Ok(())
    }

    #[test]
    fn test_unknown_columns() {
        let columns = columns();
        let mut helper = IndexedVarHelper::new(columns.len());

        let err = analyze("height > 0", &columns, &mut helper).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExpressionError>(),
            Some(&ExpressionError::UnknownColumn {
                name: "height".to_string()
            })
        );

        let err = analyze("other.age > 0", &columns, &mut helper).unwrap_err();
        assert!(err.to_string().contains("other.age"));
    }

    #[test]
    fn test_rejects_non_boolean() {
        let columns = columns();
        let mut helper = IndexedVarHelper::new(columns.len());

        let err = analyze("age + 1", &columns, &mut helper).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExpressionError>(),
            Some(ExpressionError::TypeMismatch {
                expected: DataType::Boolean,
                actual: DataType::Int32,
                ..
            })
        ));
        assert!(analyze("name > 3", &columns, &mut helper).is_err());
        assert!(analyze("NULL", &columns, &mut helper).is_ok());
    }

    #[test]
    fn test_in_and_between_keep_three_valued_logic() -> anyhow::Result<()> {
        let columns = columns();
        let ctx = EvalContext::default();
        let mut helper = IndexedVarHelper::new(columns.len());

        let in_list = analyze("age IN (1, NULL)", &columns, &mut helper)?;
        let not_between = analyze("age NOT BETWEEN 1 AND 10", &columns, &mut helper)?;

        let row = |age: Value| Row {
            columns: &columns,
            values: vec![Value::Int32(1), Value::Null, age],
        };

        assert_eq!(
            evaluate_expression(&in_list, &row(Value::Int32(1)), &ctx)?,
            Value::Boolean(true)
        );
        // 2 = 1 OR 2 = NULL is unknown, not false
        assert_eq!(
            evaluate_expression(&in_list, &row(Value::Int32(2)), &ctx)?,
            Value::Null
        );
        assert_eq!(
            evaluate_expression(&not_between, &row(Value::Int32(11)), &ctx)?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate_expression(&not_between, &row(Value::Int32(5)), &ctx)?,
            Value::Boolean(false)
        );
        assert_eq!(
            evaluate_expression(&not_between, &row(Value::Null), &ctx)?,
            Value::Null
        );
        Ok(())
    }
}
