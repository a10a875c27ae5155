//! Query planner for converting SQL AST to executable plans.
//!
//! Planning resolves table and column names against the catalog and type
//! checks every expression, producing a physical plan whose expressions
//! refer to columns by ordinal. An `ExecutablePlan` then drives the
//! executor tree built from it: `expand` builds the executors, `start`
//! initializes them and `next` advances one row at a time.

pub mod physical;

use crate::access::{DataType, Tuple, Value};
use crate::catalog::{Catalog, ColumnInfo, TableInfo};
use crate::executor::{
    ExecutionContext, Executor, FilterExecutor, InsertExecutor, LimitExecutor,
    ProjectionExecutor, RowValues, SeqScanExecutor, UpdateAssignment, UpdateExecutor,
};
use crate::expression::{EvalContext, ExpressionAnalyzer, IndexedVarHelper};
use crate::sql::ast::{self, InsertStatement, SelectItem, SelectStatement, Statement, UpdateStatement};
use anyhow::{anyhow, bail, Result};
use std::sync::Arc;

pub use physical::{PhysicalPlan, PhysicalPlanNode};

/// Query planner that converts SQL AST to executable plans
pub struct Planner {
    catalog: Arc<Catalog>,
    eval_ctx: EvalContext,
}

impl Planner {
    /// Create a planner for statements evaluated under `eval_ctx`
    pub fn new(catalog: Arc<Catalog>, eval_ctx: EvalContext) -> Self {
        Self { catalog, eval_ctx }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Convert a DML or query statement to a physical plan
    pub fn plan(&self, stmt: Statement) -> Result<PhysicalPlan> {
        match stmt {
            Statement::Select(select) => self.plan_select_statement(select),
            Statement::Insert(insert) => self.plan_insert(insert),
            Statement::Update(update) => self.plan_update(update),
            Statement::CreateTable(_) | Statement::AlterTable(_) => {
                Err(anyhow!("DDL statements are not planned"))
            }
        }
    }

    /// Plan `SELECT columns FROM table [WHERE predicate] [LIMIT limit]`.
    /// `None` for `columns` selects every column in table order.
    pub fn plan_select(
        &self,
        columns: Option<&[String]>,
        table: &str,
        predicate: Option<&ast::Expression>,
        limit: Option<usize>,
    ) -> Result<ExecutablePlan> {
        let node = self.select_node(columns, table, predicate, limit)?;
        Ok(self.prepare(PhysicalPlan::Select(node)))
    }

    /// Wrap a physical plan for execution
    pub fn prepare(&self, plan: PhysicalPlan) -> ExecutablePlan {
        ExecutablePlan::new(
            plan,
            ExecutionContext::new(self.catalog.clone(), self.eval_ctx),
        )
    }

    // Private helper methods

    fn table(&self, name: &str) -> Result<TableInfo> {
        self.catalog
            .get_table(name)
            .ok_or_else(|| anyhow!("Table '{}' not found", name))
    }

    fn plan_select_statement(&self, select: SelectStatement) -> Result<PhysicalPlan> {
        let columns = if select
            .projections
            .iter()
            .any(|item| matches!(item, SelectItem::AllColumns))
        {
            if select.projections.len() > 1 {
                bail!("'*' cannot be combined with other select items");
            }
            None
        } else {
            Some(
                select
                    .projections
                    .into_iter()
                    .filter_map(|item| match item {
                        SelectItem::Column(name) => Some(name),
                        SelectItem::AllColumns => None,
                    })
                    .collect::<Vec<_>>(),
            )
        };

        let node = self.select_node(
            columns.as_deref(),
            &select.from,
            select.where_clause.as_ref(),
            select.limit,
        )?;
        Ok(PhysicalPlan::Select(node))
    }

    fn select_node(
        &self,
        columns: Option<&[String]>,
        table: &str,
        predicate: Option<&ast::Expression>,
        limit: Option<usize>,
    ) -> Result<Box<PhysicalPlanNode>> {
        let table_info = self.table(table)?;

        let mut plan = self.scan_with_filter(&table_info, predicate)?;

        if let Some(names) = columns {
            let mut indices = Vec::with_capacity(names.len());
            for name in names {
                let idx = table_info
                    .column_index(name)
                    .ok_or_else(|| anyhow!("column \"{}\" does not exist", name))?;
                indices.push(idx);
            }
            let names = indices
                .iter()
                .map(|&idx| table_info.columns[idx].name.clone())
                .collect();
            plan = PhysicalPlanNode::Projection {
                input: Box::new(plan),
                columns: indices,
                names,
            };
        }

        if let Some(limit) = limit {
            plan = PhysicalPlanNode::Limit {
                input: Box::new(plan),
                limit,
            };
        }

        Ok(Box::new(plan))
    }

    /// Scan of `table_info`, filtered by `predicate` when there is one
    fn scan_with_filter(
        &self,
        table_info: &TableInfo,
        predicate: Option<&ast::Expression>,
    ) -> Result<PhysicalPlanNode> {
        let scan = PhysicalPlanNode::SeqScan {
            table_name: table_info.table_name.clone(),
        };
        let Some(predicate) = predicate else {
            return Ok(scan);
        };

        let row = RowValues::new(table_info.columns.clone());
        let mut helper = IndexedVarHelper::new(table_info.columns.len());
        let predicate = ExpressionAnalyzer::new(&table_info.columns, &table_info.table_name)
            .analyze(predicate, &mut helper, &row, DataType::Boolean)?;
        let predicate_text = predicate.display(&row).to_string();

        Ok(PhysicalPlanNode::Filter {
            input: Box::new(scan),
            predicate,
            predicate_text,
        })
    }

    fn plan_insert(&self, insert: InsertStatement) -> Result<PhysicalPlan> {
        let table_info = self.table(&insert.table_name)?;

        let targets: Vec<&ColumnInfo> = match &insert.columns {
            Some(names) => names
                .iter()
                .map(|name| {
                    table_info
                        .column_index(name)
                        .map(|idx| &table_info.columns[idx])
                        .ok_or_else(|| anyhow!("column \"{}\" does not exist", name))
                })
                .collect::<Result<_>>()?,
            None => table_info.columns.iter().collect(),
        };

        // VALUES may not reference columns
        let constants = RowValues::new(Vec::new());
        let analyzer = ExpressionAnalyzer::new(&[], &table_info.table_name);

        let mut values = Vec::with_capacity(insert.values.len());
        for (row_num, row) in insert.values.iter().enumerate() {
            if row.len() != targets.len() {
                bail!(
                    "Row {} has {} values but {} columns were specified",
                    row_num,
                    row.len(),
                    targets.len()
                );
            }
            let mut typed = Vec::with_capacity(row.len());
            for (expr, column) in row.iter().zip(&targets) {
                let mut helper = IndexedVarHelper::new(0);
                typed.push(analyzer.analyze(expr, &mut helper, &constants, column.data_type)?);
            }
            values.push(typed);
        }

        Ok(PhysicalPlan::Insert {
            table: table_info.table_name.clone(),
            columns: insert.columns,
            values,
        })
    }

    fn plan_update(&self, update: UpdateStatement) -> Result<PhysicalPlan> {
        let table_info = self.table(&update.table_name)?;
        let row = RowValues::new(table_info.columns.clone());
        let analyzer = ExpressionAnalyzer::new(&table_info.columns, &table_info.table_name);

        let mut assignments = Vec::with_capacity(update.assignments.len());
        let mut assignment_text = Vec::with_capacity(update.assignments.len());
        for assignment in &update.assignments {
            let idx = table_info
                .column_index(&assignment.column)
                .ok_or_else(|| anyhow!("column \"{}\" does not exist", assignment.column))?;
            let column = &table_info.columns[idx];
            let mut helper = IndexedVarHelper::new(table_info.columns.len());
            let value = analyzer.analyze(&assignment.value, &mut helper, &row, column.data_type)?;
            assignment_text.push(format!("{} = {}", column.name, value.display(&row)));
            assignments.push(UpdateAssignment::new(idx, value));
        }

        let input = self.scan_with_filter(&table_info, update.where_clause.as_ref())?;
        Ok(PhysicalPlan::Update {
            table: table_info.table_name.clone(),
            assignments,
            assignment_text,
            input: Box::new(input),
        })
    }
}

/// Build the executor tree for a plan node
fn create_executor(node: &PhysicalPlanNode, context: &ExecutionContext) -> Box<dyn Executor> {
    match node {
        PhysicalPlanNode::SeqScan { table_name } => {
            Box::new(SeqScanExecutor::new(table_name.clone(), context.clone()))
        }
        PhysicalPlanNode::Filter {
            input, predicate, ..
        } => {
            let child = create_executor(input, context);
            Box::new(FilterExecutor::new(child, predicate.clone(), context.eval_ctx))
        }
        PhysicalPlanNode::Projection { input, columns, .. } => {
            let child = create_executor(input, context);
            Box::new(ProjectionExecutor::new(child, columns.clone()))
        }
        PhysicalPlanNode::Limit { input, limit } => {
            let child = create_executor(input, context);
            Box::new(LimitExecutor::new(child, *limit))
        }
    }
}

/// A planned statement ready to run
pub struct ExecutablePlan {
    plan: PhysicalPlan,
    context: ExecutionContext,
    root: Option<Box<dyn Executor>>,
    current: Option<Tuple>,
    started: bool,
}

impl ExecutablePlan {
    fn new(plan: PhysicalPlan, context: ExecutionContext) -> Self {
        Self {
            plan,
            context,
            root: None,
            current: None,
            started: false,
        }
    }

    pub fn plan(&self) -> &PhysicalPlan {
        &self.plan
    }

    /// Build the executor tree
    pub fn expand(&mut self) -> Result<()> {
        if self.root.is_some() {
            bail!("Plan already expanded");
        }
        let root: Box<dyn Executor> = match &self.plan {
            PhysicalPlan::Select(node) => create_executor(node, &self.context),
            PhysicalPlan::Insert {
                table,
                columns,
                values,
            } => Box::new(InsertExecutor::new(
                table.clone(),
                columns.clone(),
                values.clone(),
                self.context.clone(),
            )),
            PhysicalPlan::Update {
                table,
                assignments,
                input,
                ..
            } => Box::new(UpdateExecutor::new(
                table.clone(),
                assignments.clone(),
                create_executor(input, &self.context),
                self.context.clone(),
            )),
        };
        self.root = Some(root);
        Ok(())
    }

    /// Initialize the executor tree
    pub fn start(&mut self) -> Result<()> {
        let root = self
            .root
            .as_mut()
            .ok_or_else(|| anyhow!("Plan not expanded. Call expand() first."))?;
        root.init()?;
        self.started = true;
        Ok(())
    }

    /// Advance to the next row. Returns false when the plan is exhausted.
    pub fn next(&mut self) -> Result<bool> {
        if !self.started {
            bail!("Plan not started. Call start() first.");
        }
        let root = self
            .root
            .as_mut()
            .ok_or_else(|| anyhow!("Plan not expanded. Call expand() first."))?;
        self.current = root.next()?;
        Ok(self.current.is_some())
    }

    /// Values of the current row; empty before the first row and after the last
    pub fn values(&self) -> &[Value] {
        self.current
            .as_ref()
            .map(|tuple| tuple.values.as_slice())
            .unwrap_or(&[])
    }

    /// Output columns of the plan; empty until started
    pub fn columns(&self) -> &[ColumnInfo] {
        match &self.root {
            Some(root) if self.started => root.output_schema(),
            _ => &[],
        }
    }

    pub fn explain(&self) -> String {
        self.plan.explain()
    }
}
