//! Compilation of CHECK constraint text into typed expressions.

use crate::access::DataType;
use crate::catalog::ColumnInfo;
use crate::check::binding::RowBinding;
use crate::check::row_check::{CompiledCheck, CompiledExpr};
use crate::check::{CheckError, CheckResult};
use crate::expression::{ExpressionAnalyzer, IndexedVarHelper};
use crate::sql::Parser;

/// Compile the CHECK expressions of `table_name` against its `columns`.
///
/// All texts are parsed before any is analyzed, so a syntax error in any
/// constraint is reported ahead of type errors. Column `i` is bound to
/// slot `i`, which makes the result independent of analysis order.
pub fn compile<S: AsRef<str>>(
    table_name: &str,
    columns: &[ColumnInfo],
    checks: &[S],
) -> CheckResult<CompiledCheck> {
    if checks.is_empty() {
        return Ok(CompiledCheck::empty());
    }

    let parsed = checks
        .iter()
        .map(|text| {
            Parser::parse_expression_text(text.as_ref())
                .map_err(|e| CheckError::Parse(e.to_string()))
        })
        .collect::<CheckResult<Vec<_>>>()?;

    let mut binding = RowBinding::new(columns.to_vec());
    let mut helper = IndexedVarHelper::new(columns.len());
    let analyzer = ExpressionAnalyzer::new(columns, table_name);

    let mut exprs = Vec::with_capacity(parsed.len());
    for (ast, text) in parsed.iter().zip(checks) {
        let expr = analyzer
            .analyze(ast, &mut helper, &binding, DataType::Boolean)
            .map_err(|e| CheckError::Type(format!("CHECK ({}): {}", text.as_ref(), e)))?;
        exprs.push(CompiledExpr {
            expr,
            source: text.as_ref().to_string(),
        });
    }

    binding.set_indexed_vars(helper.into_indexed_vars());
    log::debug!(
        "compiled {} CHECK expression(s) for table '{}'",
        exprs.len(),
        table_name
    );
    Ok(CompiledCheck::new(exprs, binding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Expression, IndexedVar};

    fn columns() -> Vec<ColumnInfo> {
        ColumnInfo::from_pairs(vec![
            ("id", DataType::Int32),
            ("name", DataType::Varchar),
            ("age", DataType::Int32),
        ])
    }

    #[test]
    fn test_empty_checks_allocate_nothing() -> anyhow::Result<()> {
        let compiled = compile::<&str>("people", &columns(), &[])?;
        assert!(compiled.is_empty());
        assert!(compiled.row_buffer().is_none());
        assert!(compiled.indexed_vars().is_empty());
        Ok(())
    }

    #[test]
    fn test_one_expression_per_check() -> anyhow::Result<()> {
        let compiled = compile("people", &columns(), &["age > 0", "name IS NOT NULL"])?;
        assert_eq!(compiled.len(), 2);
        assert_eq!(compiled.exprs()[1].source, "name IS NOT NULL");
        assert_eq!(compiled.row_buffer().map(|row| row.len()), Some(3));
        assert_eq!(
            compiled.indexed_vars(),
            &[
                IndexedVar::unreferenced(),
                IndexedVar { slot: Some(1) },
                IndexedVar { slot: Some(2) },
            ]
        );
        assert_eq!(
            compiled.exprs()[0].expr,
            Expression::gt(
                Expression::IndexedVar(2),
                Expression::literal(crate::access::Value::Int32(0))
            )
        );
        Ok(())
    }

    #[test]
    fn test_compilation_is_deterministic() -> anyhow::Result<()> {
        let checks = ["age BETWEEN 0 AND 150", "id <> age OR name IN ('a', 'b')"];
        let first = compile("people", &columns(), &checks)?;
        let second = compile("people", &columns(), &checks)?;

        assert_eq!(first.exprs(), second.exprs());
        assert_eq!(first.indexed_vars(), second.indexed_vars());
        Ok(())
    }

    #[test]
    fn test_parse_errors_come_first() {
        let result = compile("people", &columns(), &["height > 0", "age >"]);
        assert!(matches!(result, Err(CheckError::Parse(_))));
    }

    #[test]
    fn test_type_errors() {
        let result = compile("people", &columns(), &["age + 1"]);
        match result {
            Err(CheckError::Type(msg)) => assert!(msg.contains("CHECK (age + 1)")),
            other => panic!("expected type error, got {:?}", other.map(|c| c.len())),
        }

        let result = compile("people", &columns(), &["height > 0"]);
        match result {
            Err(CheckError::Type(msg)) => assert!(msg.contains("\"height\" does not exist")),
            other => panic!("expected type error, got {:?}", other.map(|c| c.len())),
        }
    }
}
