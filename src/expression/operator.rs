//! Operator definitions for expressions.

use crate::access::DataType;

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,

    // String
    Concat,
}

impl BinaryOperator {
    /// Get the output type of this operator given input types
    pub fn output_type(&self, left: DataType, right: DataType) -> Option<DataType> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => match (left, right) {
                (DataType::Int32, DataType::Int32) => Some(DataType::Int32),
                _ => None,
            },

            // Only same-typed operands are comparable
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => {
                if left == right {
                    Some(DataType::Boolean)
                } else {
                    None
                }
            }

            BinaryOperator::And | BinaryOperator::Or => match (left, right) {
                (DataType::Boolean, DataType::Boolean) => Some(DataType::Boolean),
                _ => None,
            },

            BinaryOperator::Concat => match (left, right) {
                (DataType::Varchar, DataType::Varchar) => Some(DataType::Varchar),
                _ => None,
            },
        }
    }

    /// Output type when one side is an untyped NULL
    pub fn output_type_with_null(&self, known: Option<DataType>) -> Option<DataType> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => match known {
                Some(DataType::Int32) | None => Some(DataType::Int32),
                Some(_) => None,
            },
            BinaryOperator::Concat => match known {
                Some(DataType::Varchar) | None => Some(DataType::Varchar),
                Some(_) => None,
            },
            BinaryOperator::And | BinaryOperator::Or => match known {
                Some(DataType::Boolean) | None => Some(DataType::Boolean),
                Some(_) => None,
            },
            _ => Some(DataType::Boolean),
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Concat => "||",
        }
    }
}

impl From<crate::sql::BinaryOperator> for BinaryOperator {
    fn from(op: crate::sql::BinaryOperator) -> Self {
        use crate::sql::BinaryOperator as Sql;
        match op {
            Sql::Plus => BinaryOperator::Add,
            Sql::Minus => BinaryOperator::Sub,
            Sql::Multiply => BinaryOperator::Mul,
            Sql::Divide => BinaryOperator::Div,
            Sql::Modulo => BinaryOperator::Mod,
            Sql::Concat => BinaryOperator::Concat,
            Sql::Equal => BinaryOperator::Eq,
            Sql::NotEqual => BinaryOperator::Ne,
            Sql::Less => BinaryOperator::Lt,
            Sql::Greater => BinaryOperator::Gt,
            Sql::LessEqual => BinaryOperator::Le,
            Sql::GreaterEqual => BinaryOperator::Ge,
            Sql::And => BinaryOperator::And,
            Sql::Or => BinaryOperator::Or,
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    // Logical
    Not,

    // NULL checks
    IsNull,
    IsNotNull,

    // Arithmetic
    Plus,
    Minus,
}

impl UnaryOperator {
    /// Get the output type of this operator given input type
    pub fn output_type(&self, operand: DataType) -> Option<DataType> {
        match self {
            UnaryOperator::Not => match operand {
                DataType::Boolean => Some(DataType::Boolean),
                _ => None,
            },

            // NULL checks always return boolean regardless of input type
            UnaryOperator::IsNull | UnaryOperator::IsNotNull => Some(DataType::Boolean),

            UnaryOperator::Plus | UnaryOperator::Minus => match operand {
                DataType::Int32 => Some(DataType::Int32),
                _ => None,
            },
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::IsNull => "IS NULL",
            UnaryOperator::IsNotNull => "IS NOT NULL",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
        }
    }

    /// Whether the operator is written after its operand
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOperator::IsNull | UnaryOperator::IsNotNull)
    }
}
