// SQL Abstract Syntax Tree (AST) definitions

use crate::access::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    CreateTable(CreateTableStatement),
    AlterTable(AlterTableStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projections: Vec<SelectItem>,
    pub from: String,
    pub where_clause: Option<Expression>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    AllColumns,
    Column(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<TableConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Int,
    Varchar(Option<u32>),
    Text,
    Boolean,
}

impl DataType {
    /// Storage type backing this SQL type
    pub fn storage_type(&self) -> crate::access::DataType {
        match self {
            DataType::Int => crate::access::DataType::Int32,
            DataType::Varchar(_) | DataType::Text => crate::access::DataType::Varchar,
            DataType::Boolean => crate::access::DataType::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    Check(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    Check {
        name: Option<String>,
        expr: Expression,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub table_name: String,
    pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddCheck {
        name: Option<String>,
        expr: Expression,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Literals
    Literal(Value),

    // Null literal
    Null,

    // Column reference
    Column(String),
    QualifiedColumn(String, String), // table.column

    // Binary operations
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    // Unary operations
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    // IN expression
    InList {
        expression: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },

    // BETWEEN expression
    Between {
        expression: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },

    // IS NULL expression
    IsNull {
        expression: Box<Expression>,
        negated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,

    // String
    Concat,

    // Comparison
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Concat => "||",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

impl Expression {
    /// Create a literal expression from a value
    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    /// Create a column reference expression
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    /// Wrap an expression in NOT
    pub fn not(self) -> Self {
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(self),
        }
    }

    /// Create a greater than comparison
    pub fn gt(self, other: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(self),
            op: BinaryOperator::Greater,
            right: Box::new(other),
        }
    }

    /// Create an AND expression
    pub fn and(self, other: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(self),
            op: BinaryOperator::And,
            right: Box::new(other),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expression::BinaryOp { .. }
                | Expression::InList { .. }
                | Expression::Between { .. }
                | Expression::IsNull { .. }
                | Expression::UnaryOp {
                    op: UnaryOperator::Not,
                    ..
                }
        )
    }
}

/// Writes an operand, parenthesized when it is itself compound.
struct Operand<'a>(&'a Expression);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_compound() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && crate::sql::Token::keyword_from_str(name).is_none();
    if plain {
        write!(f, "{}", name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

/// Canonical SQL rendering. The output parses back to an equal tree, which
/// is what lets CHECK constraints be stored as text.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Null => write!(f, "NULL"),
            Expression::Column(name) => write_ident(f, name),
            Expression::QualifiedColumn(table, column) => {
                write_ident(f, table)?;
                write!(f, ".")?;
                write_ident(f, column)
            }
            Expression::BinaryOp { left, op, right } => {
                write!(f, "{} {} {}", Operand(left), op.as_str(), Operand(right))
            }
            Expression::UnaryOp { op, operand } => match op {
                UnaryOperator::Not => write!(f, "NOT {}", Operand(operand)),
                // "--" would lex as a comment
                UnaryOperator::Minus if operand.to_string().starts_with('-') => {
                    write!(f, "-({})", operand)
                }
                UnaryOperator::Minus => write!(f, "-{}", Operand(operand)),
                UnaryOperator::Plus => write!(f, "+{}", Operand(operand)),
            },
            Expression::InList {
                expression,
                list,
                negated,
            } => {
                write!(f, "{} ", Operand(expression))?;
                if *negated {
                    write!(f, "NOT ")?;
                }
                write!(f, "IN (")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Expression::Between {
                expression,
                low,
                high,
                negated,
            } => {
                write!(f, "{} ", Operand(expression))?;
                if *negated {
                    write!(f, "NOT ")?;
                }
                write!(f, "BETWEEN {} AND {}", Operand(low), Operand(high))
            }
            Expression::IsNull {
                expression,
                negated,
            } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", Operand(expression))
                } else {
                    write!(f, "{} IS NULL", Operand(expression))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_builders() {
        let expr = Expression::column("age")
            .gt(Expression::literal(Value::Int32(18)))
            .and(Expression::column("active"));

        match expr {
            Expression::BinaryOp {
                op: BinaryOperator::And,
                ..
            } => {}
            _ => panic!("Expected AND expression"),
        }
    }

    #[test]
    fn test_display() {
        let expr = Expression::column("age").gt(Expression::literal(Value::Int32(0)));
        assert_eq!(expr.to_string(), "age > 0");

        let expr = expr.and(Expression::IsNull {
            expression: Box::new(Expression::column("name")),
            negated: true,
        });
        assert_eq!(expr.to_string(), "(age > 0) AND (name IS NOT NULL)");

        let expr = Expression::column("status").not();
        assert_eq!(expr.to_string(), "NOT status");

        let expr = Expression::InList {
            expression: Box::new(Expression::column("kind")),
            list: vec![
                Expression::literal(Value::String("a".to_string())),
                Expression::Null,
            ],
            negated: true,
        };
        assert_eq!(expr.to_string(), "kind NOT IN ('a', NULL)");
    }

    #[test]
    fn test_display_quotes_identifiers() {
        assert_eq!(Expression::column("order total").to_string(), "\"order total\"");
        assert_eq!(Expression::column("check").to_string(), "\"check\"");
        assert_eq!(Expression::column("price_2").to_string(), "price_2");
    }

    #[test]
    fn test_storage_type() {
        assert_eq!(DataType::Int.storage_type(), crate::access::DataType::Int32);
        assert_eq!(
            DataType::Varchar(Some(10)).storage_type(),
            crate::access::DataType::Varchar
        );
        assert_eq!(DataType::Text.storage_type(), crate::access::DataType::Varchar);
    }
}
