//! Physical query plan representation.
//!
//! Physical plans map directly to executor implementations. Expressions in
//! a plan are already resolved and type checked against the scanned table.

use crate::executor::UpdateAssignment;
use crate::expression::Expression;

/// Root physical plan types
#[derive(Debug, Clone)]
pub enum PhysicalPlan {
    /// SELECT query execution
    Select(Box<PhysicalPlanNode>),

    /// INSERT execution
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Vec<Expression>>,
    },

    /// UPDATE execution. `input` produces the rows to update.
    Update {
        table: String,
        assignments: Vec<UpdateAssignment>,
        assignment_text: Vec<String>,
        input: Box<PhysicalPlanNode>,
    },
}

/// Physical plan node for query execution trees
#[derive(Debug, Clone)]
pub enum PhysicalPlanNode {
    /// Sequential scan of a table
    SeqScan { table_name: String },

    /// Filter rows based on predicate
    Filter {
        input: Box<PhysicalPlanNode>,
        predicate: Expression,
        /// Predicate rendered with column names
        predicate_text: String,
    },

    /// Project specific columns
    Projection {
        input: Box<PhysicalPlanNode>,
        columns: Vec<usize>,
        names: Vec<String>,
    },

    /// Limit rows
    Limit {
        input: Box<PhysicalPlanNode>,
        limit: usize,
    },
}

impl PhysicalPlan {
    /// Get a human-readable explanation of this plan
    pub fn explain(&self) -> String {
        match self {
            PhysicalPlan::Select(node) => {
                let mut result = String::from("SELECT:\n");
                result.push_str(&node.explain(1));
                result
            }
            PhysicalPlan::Insert {
                table,
                columns,
                values,
            } => {
                format!(
                    "INSERT INTO {} ({}) VALUES ({} rows)",
                    table,
                    columns
                        .as_ref()
                        .map(|c| c.join(", "))
                        .unwrap_or_else(|| "all columns".to_string()),
                    values.len()
                )
            }
            PhysicalPlan::Update {
                table,
                assignment_text,
                input,
                ..
            } => {
                let mut result = format!("UPDATE {} SET {}\n", table, assignment_text.join(", "));
                result.push_str(&input.explain(1));
                result
            }
        }
    }
}

impl PhysicalPlanNode {
    /// Get a human-readable explanation of this node
    pub fn explain(&self, indent_level: usize) -> String {
        let indent = "  ".repeat(indent_level);

        match self {
            PhysicalPlanNode::SeqScan { table_name } => {
                format!("{}SeqScan: {}", indent, table_name)
            }

            PhysicalPlanNode::Filter {
                input,
                predicate_text,
                ..
            } => {
                let mut result = format!("{}Filter: {}\n", indent, predicate_text);
                result.push_str(&input.explain(indent_level + 1));
                result
            }

            PhysicalPlanNode::Projection { input, names, .. } => {
                let mut result = format!("{}Projection: {}\n", indent, names.join(", "));
                result.push_str(&input.explain(indent_level + 1));
                result
            }

            PhysicalPlanNode::Limit { input, limit } => {
                let mut result = format!("{}Limit: {}\n", indent, limit);
                result.push_str(&input.explain(indent_level + 1));
                result
            }
        }
    }
}
