use crate::access::{DataType, Value};
use crate::catalog::{Catalog, ColumnInfo, TableInfo};
use crate::check::{compile, validate_check_expr};
use crate::expression::EvalContext;
use crate::planner::Planner;
use crate::sql::ast::{
    AlterTableAction, AlterTableStatement, ColumnConstraint, CreateTableStatement, Statement,
    TableConstraint,
};
use crate::sql::Parser;
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Result of executing a statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Rows of a SELECT
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// Number of rows affected by an INSERT or UPDATE
    Count(usize),
    /// DDL completed
    Ok,
}

/// High-level database interface that integrates all layers
pub struct Database {
    catalog: Arc<Catalog>,
    /// Statement clock; every statement gets the next tick
    clock: AtomicU64,
}

impl Database {
    /// Create an empty in-memory database
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(Catalog::new()),
            clock: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Parse and execute a single statement
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let statement = Parser::new(sql).parse()?;
        let planner = self.planner();
        log::debug!("executing: {}", sql.trim());

        match statement {
            Statement::CreateTable(create) => {
                self.create_table(create)?;
                Ok(QueryResult::Ok)
            }
            Statement::AlterTable(alter) => {
                self.alter_table(&planner, alter)?;
                Ok(QueryResult::Ok)
            }
            statement => {
                let is_select = matches!(statement, Statement::Select(_));
                let mut plan = planner.prepare(planner.plan(statement)?);
                plan.expand()?;
                plan.start()?;

                let columns = plan.columns().iter().map(|c| c.name.clone()).collect();
                let mut rows = Vec::new();
                while plan.next()? {
                    rows.push(plan.values().to_vec());
                }

                if is_select {
                    return Ok(QueryResult::Rows { columns, rows });
                }
                match rows.first().and_then(|row| row.first()) {
                    Some(Value::Int32(count)) => Ok(QueryResult::Count(*count as usize)),
                    _ => Err(anyhow!("DML statement did not report a row count")),
                }
            }
        }
    }

    /// Physical plan of a SELECT, INSERT or UPDATE
    pub fn explain(&self, sql: &str) -> Result<String> {
        let statement = Parser::new(sql).parse()?;
        Ok(self.planner().plan(statement)?.explain())
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.list_tables()
    }

    fn planner(&self) -> Planner {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        Planner::new(self.catalog.clone(), EvalContext::new(tick))
    }

    fn create_table(&self, create: CreateTableStatement) -> Result<TableInfo> {
        let columns: Vec<(String, DataType)> = create
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.data_type.storage_type()))
            .collect();

        // Column checks first, then table checks, in declaration order
        let mut checks: Vec<(Option<String>, String)> = Vec::new();
        for column in &create.columns {
            for constraint in &column.constraints {
                match constraint {
                    ColumnConstraint::Check(expr) => checks.push((None, expr.to_string())),
                }
            }
        }
        for constraint in &create.constraints {
            match constraint {
                TableConstraint::Check { name, expr } => {
                    checks.push((name.clone(), expr.to_string()))
                }
            }
        }

        // A check that does not compile rejects the table
        let texts: Vec<&str> = checks.iter().map(|(_, text)| text.as_str()).collect();
        compile(
            &create.table_name,
            &ColumnInfo::from_pairs(columns.clone()),
            &texts,
        )?;

        let info = self
            .catalog
            .create_table(&create.table_name, columns, checks)?;
        log::info!(
            "created table '{}' with {} CHECK constraint(s)",
            info.table_name,
            info.checks.len()
        );
        Ok(info)
    }

    fn alter_table(&self, planner: &Planner, alter: AlterTableStatement) -> Result<()> {
        let table = self
            .catalog
            .get_table(&alter.table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", alter.table_name))?;

        match alter.action {
            AlterTableAction::AddCheck { name, expr } => {
                let text = expr.to_string();
                validate_check_expr(planner, &text, &table)?;
                self.catalog.add_check(&table.table_name, name, text)?;
            }
        }
        Ok(())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckError;

    fn people() -> Result<Database> {
        let db = Database::new();
        db.execute(
            "CREATE TABLE people (id INT, name VARCHAR(20), age INT CHECK (age >= 0), \
             CONSTRAINT named CHECK (name <> ''))",
        )?;
        Ok(db)
    }

    #[test]
    fn test_create_table_records_checks() -> Result<()> {
        let db = people()?;
        let table = db.catalog().get_table("people").unwrap();
        let texts: Vec<&str> = table.checks.iter().map(|c| c.expr.as_str()).collect();
        assert_eq!(texts, vec!["age >= 0", "name <> ''"]);
        assert_eq!(table.checks[1].name.as_deref(), Some("named"));
        assert_eq!(db.list_tables(), vec!["people".to_string()]);
        Ok(())
    }

    #[test]
    fn test_create_table_rejects_bad_checks() -> Result<()> {
        let db = Database::new();
        let err = db
            .execute("CREATE TABLE t (a INT CHECK (a + 1))")
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<CheckError>(), Some(CheckError::Type(_))));

        let err = db
            .execute("CREATE TABLE t (a INT, CHECK (b > 0))")
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<CheckError>(), Some(CheckError::Type(_))));
        assert!(db.catalog().get_table("t").is_none());
        Ok(())
    }

    #[test]
    fn test_insert_select_update() -> Result<()> {
        let db = people()?;
        assert_eq!(
            db.execute("INSERT INTO people VALUES (1, 'ann', 30), (2, 'bob', NULL)")?,
            QueryResult::Count(2)
        );
        assert_eq!(
            db.execute("UPDATE people SET age = age + 1 WHERE id = 1")?,
            QueryResult::Count(1)
        );

        let result = db.execute("SELECT name, age FROM people WHERE age IS NOT NULL")?;
        assert_eq!(
            result,
            QueryResult::Rows {
                columns: vec!["name".to_string(), "age".to_string()],
                rows: vec![vec![Value::String("ann".to_string()), Value::Int32(31)]],
            }
        );
        Ok(())
    }

    #[test]
    fn test_violations_are_reported() -> Result<()> {
        let db = people()?;
        let err = db
            .execute("INSERT INTO people VALUES (1, 'ann', -1)")
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to satisfy CHECK constraint (age >= 0)");

        db.execute("INSERT INTO people VALUES (1, 'ann', 0)")?;
        let err = db
            .execute("UPDATE people SET name = ''")
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to satisfy CHECK constraint (name <> '')");
        Ok(())
    }

    #[test]
    fn test_alter_table_validates_existing_rows() -> Result<()> {
        let db = people()?;
        db.execute("INSERT INTO people VALUES (1, 'ann', 5), (2, 'bob', 10)")?;
        db.execute("ALTER TABLE people ADD CONSTRAINT adult CHECK (age > 2)")?;

        let err = db
            .execute("ALTER TABLE people ADD CHECK (age > 7)")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation of CHECK \"age > 7\" failed on row: id=1, name='ann', age=5"
        );

        // The added check now applies to writes
        assert!(db.execute("INSERT INTO people VALUES (3, 'cy', 1)").is_err());
        assert_eq!(db.catalog().get_table("people").unwrap().checks.len(), 3);
        Ok(())
    }

    #[test]
    fn test_explain() -> Result<()> {
        let db = people()?;
        assert_eq!(
            db.explain("SELECT * FROM people WHERE age > 1 LIMIT 5")?,
            "SELECT:\n  Limit: 5\n    Filter: age > 1\n      SeqScan: people"
        );
        assert!(db.explain("CREATE TABLE x (a INT)").is_err());
        Ok(())
    }
}
