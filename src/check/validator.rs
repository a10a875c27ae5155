//! Validation of existing rows against a newly added CHECK constraint.

use crate::catalog::TableInfo;
use crate::check::{CheckError, CheckResult, RenderedRow};
use crate::expression::ExpressionError;
use crate::planner::Planner;
use crate::sql::Parser;

/// Search `table` for a row violating `expr_text`.
///
/// Runs `SELECT * FROM table WHERE NOT (expr) LIMIT 1`. The filter passes
/// rows only when its predicate is TRUE, so a row whose check evaluates to
/// NULL is never reported. Rows written concurrently with the scan may be
/// missed.
pub fn validate_check_expr(planner: &Planner, expr_text: &str, table: &TableInfo) -> CheckResult<()> {
    let expr = Parser::parse_expression_text(expr_text).map_err(|e| CheckError::Parse(e.to_string()))?;

    let mut plan = planner
        .plan_select(None, &table.table_name, Some(&expr.not()), Some(1))
        .map_err(|e| match e.downcast::<ExpressionError>() {
            Ok(analysis) => CheckError::Type(format!("CHECK ({}): {}", expr_text, analysis)),
            Err(other) => CheckError::Execution(other),
        })?;
    log::debug!("validating CHECK ({}) with plan:\n{}", expr_text, plan.explain());

    plan.expand()?;
    plan.start()?;
    if plan.next()? {
        let row = RenderedRow::new(&table.column_names(), plan.values());
        log::info!(
            "CHECK ({}) on '{}' violated by existing row: {}",
            expr_text,
            table.table_name,
            row
        );
        return Err(CheckError::Validation {
            expr: expr_text.to_string(),
            row,
        });
    }

    log::info!("CHECK ({}) holds for all rows of '{}'", expr_text, table.table_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{DataType, Value};
    use crate::catalog::Catalog;
    use crate::expression::EvalContext;
    use std::sync::Arc;

    fn setup(ages: &[Option<i32>]) -> anyhow::Result<(Planner, TableInfo)> {
        let catalog = Arc::new(Catalog::new());
        let table = catalog.create_table(
            "people",
            vec![
                ("id".to_string(), DataType::Int32),
                ("age".to_string(), DataType::Int32),
            ],
            vec![],
        )?;
        let heap = catalog.heap("people").unwrap();
        for (i, age) in ages.iter().enumerate() {
            heap.write().insert(vec![
                Value::Int32(i as i32 + 1),
                age.map_or(Value::Null, Value::Int32),
            ])?;
        }
        Ok((Planner::new(catalog, EvalContext::new(1)), table))
    }

    #[test]
    fn test_validate_passes_on_valid_rows() -> anyhow::Result<()> {
        let (planner, table) = setup(&[Some(5), Some(10)])?;
        validate_check_expr(&planner, "age > 0", &table)?;
        Ok(())
    }

    #[test]
    fn test_validate_reports_violating_row() -> anyhow::Result<()> {
        let (planner, table) = setup(&[Some(5), Some(10), Some(-1)])?;

        match validate_check_expr(&planner, "age > 0", &table) {
            Err(CheckError::Validation { expr, row }) => {
                assert_eq!(expr, "age > 0");
                assert_eq!(row.get("age"), Some(&Value::Int32(-1)));
                assert_eq!(row.to_string(), "id=3, age=-1");
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_validate_null_is_not_a_violation() -> anyhow::Result<()> {
        let (planner, table) = setup(&[Some(5), None])?;
        validate_check_expr(&planner, "age > 0", &table)?;
        Ok(())
    }

    #[test]
    fn test_validate_empty_table() -> anyhow::Result<()> {
        let (planner, table) = setup(&[])?;
        validate_check_expr(&planner, "age > 100", &table)?;
        Ok(())
    }

    #[test]
    fn test_validate_error_kinds() -> anyhow::Result<()> {
        let (planner, table) = setup(&[Some(1)])?;

        assert!(matches!(
            validate_check_expr(&planner, "age >", &table),
            Err(CheckError::Parse(_))
        ));
        assert!(matches!(
            validate_check_expr(&planner, "height > 0", &table),
            Err(CheckError::Type(_))
        ));
        assert!(matches!(
            validate_check_expr(&planner, "age + 1", &table),
            Err(CheckError::Type(_))
        ));

        let (planner, table) = setup(&[Some(0)])?;
        assert!(matches!(
            validate_check_expr(&planner, "10 / age > 0", &table),
            Err(CheckError::Execution(_))
        ));
        Ok(())
    }
}
