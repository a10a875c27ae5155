// SQL parser - converts tokens to AST

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::access::Value;
use anyhow::{bail, Result};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(sql: &str) -> Self {
        let tokens = Lexer::new(sql).tokenize();
        Parser {
            tokens,
            position: 0,
        }
    }

    /// Parse a standalone expression such as the body of a CHECK constraint.
    /// Anything after the expression is an error.
    pub fn parse_expression_text(text: &str) -> Result<Expression> {
        let mut parser = Parser::new(text);
        let expr = parser.parse_expression()?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Parse a SQL statement
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = match self.current_token() {
            Token::Select => self.parse_select()?,
            Token::Insert => self.parse_insert()?,
            Token::Update => self.parse_update()?,
            Token::Create => self.parse_create_table()?,
            Token::Alter => self.parse_alter_table()?,
            _ => bail!("Expected SQL statement, found {:?}", self.current_token()),
        };
        if self.match_token(&Token::Semicolon) {
            self.advance();
        }
        self.expect_end()?;
        Ok(stmt)
    }

    /// Parse a SELECT statement
    fn parse_select(&mut self) -> Result<Statement> {
        self.expect_token(Token::Select)?;

        let projections = if self.match_token(&Token::Star) {
            self.advance();
            vec![SelectItem::AllColumns]
        } else {
            self.parse_identifier_list()?
                .into_iter()
                .map(SelectItem::Column)
                .collect()
        };

        self.expect_token(Token::From)?;
        let from = self.expect_identifier()?;

        let where_clause = if self.match_token(&Token::Where) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        let limit = if self.match_token(&Token::Limit) {
            self.advance();
            let n = self.expect_number()?;
            Some(n.parse::<usize>()?)
        } else {
            None
        };

        Ok(Statement::Select(SelectStatement {
            projections,
            from,
            where_clause,
            limit,
        }))
    }

    /// Parse an INSERT statement
    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect_token(Token::Insert)?;
        self.expect_token(Token::Into)?;
        let table_name = self.expect_identifier()?;

        let columns = if self.match_token(&Token::LeftParen) {
            self.advance();
            let columns = self.parse_identifier_list()?;
            self.expect_token(Token::RightParen)?;
            Some(columns)
        } else {
            None
        };

        self.expect_token(Token::Values)?;

        let mut values = vec![];
        loop {
            self.expect_token(Token::LeftParen)?;
            values.push(self.parse_expression_list()?);
            self.expect_token(Token::RightParen)?;
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(Statement::Insert(InsertStatement {
            table_name,
            columns,
            values,
        }))
    }

    /// Parse an UPDATE statement
    fn parse_update(&mut self) -> Result<Statement> {
        self.expect_token(Token::Update)?;
        let table_name = self.expect_identifier()?;
        self.expect_token(Token::Set)?;

        let mut assignments = vec![];
        loop {
            let column = self.expect_identifier()?;
            self.expect_token(Token::Equal)?;
            let value = self.parse_expression()?;
            assignments.push(Assignment { column, value });
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = if self.match_token(&Token::Where) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Statement::Update(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        }))
    }

    /// Parse a CREATE TABLE statement
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect_token(Token::Create)?;
        self.expect_token(Token::Table)?;
        let table_name = self.expect_identifier()?;
        self.expect_token(Token::LeftParen)?;

        let mut columns = vec![];
        let mut constraints = vec![];

        loop {
            if self.match_token(&Token::Constraint) || self.match_token(&Token::Check) {
                constraints.push(self.parse_table_constraint()?);
            } else {
                columns.push(self.parse_column_definition()?);
            }

            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect_token(Token::RightParen)?;

        Ok(Statement::CreateTable(CreateTableStatement {
            table_name,
            columns,
            constraints,
        }))
    }

    fn parse_column_definition(&mut self) -> Result<ColumnDefinition> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut constraints = vec![];
        while self.match_token(&Token::Check) {
            constraints.push(ColumnConstraint::Check(self.parse_check_body()?));
        }

        Ok(ColumnDefinition {
            name,
            data_type,
            constraints,
        })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let data_type = match self.current_token() {
            Token::Int | Token::Integer => {
                self.advance();
                DataType::Int
            }
            Token::Varchar => {
                self.advance();
                if self.match_token(&Token::LeftParen) {
                    self.advance();
                    let len = self.expect_number()?.parse::<u32>()?;
                    self.expect_token(Token::RightParen)?;
                    DataType::Varchar(Some(len))
                } else {
                    DataType::Varchar(None)
                }
            }
            Token::Text => {
                self.advance();
                DataType::Text
            }
            Token::Boolean | Token::Bool => {
                self.advance();
                DataType::Boolean
            }
            other => bail!("Expected data type, found {:?}", other),
        };
        Ok(data_type)
    }

    /// Parse `[CONSTRAINT name] CHECK (expr)`
    fn parse_table_constraint(&mut self) -> Result<TableConstraint> {
        let name = self.parse_constraint_name()?;
        let expr = self.parse_check_body()?;
        Ok(TableConstraint::Check { name, expr })
    }

    fn parse_constraint_name(&mut self) -> Result<Option<String>> {
        if self.match_token(&Token::Constraint) {
            self.advance();
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Parse `CHECK (expr)`
    fn parse_check_body(&mut self) -> Result<Expression> {
        self.expect_token(Token::Check)?;
        self.expect_token(Token::LeftParen)?;
        let expr = self.parse_expression()?;
        self.expect_token(Token::RightParen)?;
        Ok(expr)
    }

    /// Parse `ALTER TABLE t ADD [CONSTRAINT name] CHECK (expr)`
    fn parse_alter_table(&mut self) -> Result<Statement> {
        self.expect_token(Token::Alter)?;
        self.expect_token(Token::Table)?;
        let table_name = self.expect_identifier()?;
        self.expect_token(Token::Add)?;
        let name = self.parse_constraint_name()?;
        let expr = self.parse_check_body()?;

        Ok(Statement::AlterTable(AlterTableStatement {
            table_name,
            action: AlterTableAction::AddCheck { name, expr },
        }))
    }

    /// Parse expression
    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::Or,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::And,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> Result<Expression> {
        if self.match_token(&Token::Not) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expression::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            })
        } else {
            self.parse_comparison()
        }
    }

    /// Parse comparison expression
    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_addition()?;

        if self.match_token(&Token::Is) {
            self.advance();
            let negated = self.consume_not();
            self.expect_token(Token::Null)?;
            return Ok(Expression::IsNull {
                expression: Box::new(left),
                negated,
            });
        }

        // [NOT] IN / [NOT] BETWEEN
        let negated = if self.match_token(&Token::Not)
            && matches!(self.peek_token(), Token::In | Token::Between)
        {
            self.advance();
            true
        } else {
            false
        };

        if self.match_token(&Token::In) {
            self.advance();
            self.expect_token(Token::LeftParen)?;
            let list = self.parse_expression_list()?;
            self.expect_token(Token::RightParen)?;
            return Ok(Expression::InList {
                expression: Box::new(left),
                list,
                negated,
            });
        }

        if self.match_token(&Token::Between) {
            self.advance();
            let low = self.parse_addition()?;
            self.expect_token(Token::And)?;
            let high = self.parse_addition()?;
            return Ok(Expression::Between {
                expression: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            });
        }

        let op = match self.current_token() {
            Token::Equal => Some(BinaryOperator::Equal),
            Token::NotEqual => Some(BinaryOperator::NotEqual),
            Token::Less => Some(BinaryOperator::Less),
            Token::Greater => Some(BinaryOperator::Greater),
            Token::LessEqual => Some(BinaryOperator::LessEqual),
            Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let right = self.parse_addition()?;
            Ok(Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    /// Parse addition/subtraction/concatenation expression
    fn parse_addition(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Plus,
                Token::Minus => BinaryOperator::Minus,
                Token::Concat => BinaryOperator::Concat,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplication()?;
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse multiplication/division expression
    fn parse_multiplication(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                Token::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> Result<Expression> {
        match self.current_token() {
            Token::Plus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expression::UnaryOp {
                    op: UnaryOperator::Plus,
                    operand: Box::new(operand),
                })
            }
            Token::Minus => {
                self.advance();
                // Fold negative integer literals so i32::MIN is representable
                if let Token::Number(n) = self.current_token() {
                    self.advance();
                    let value = format!("-{}", n)
                        .parse::<i32>()
                        .map_err(|_| anyhow::anyhow!("Integer out of range: -{}", n))?;
                    return Ok(Expression::Literal(Value::Int32(value)));
                }
                let operand = self.parse_unary()?;
                Ok(Expression::UnaryOp {
                    op: UnaryOperator::Minus,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_primary(),
        }
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expression> {
        match self.current_token() {
            Token::Number(n) => {
                self.advance();
                match n.parse::<i32>() {
                    Ok(i) => Ok(Expression::Literal(Value::Int32(i))),
                    Err(_) => bail!("Integer out of range: {}", n),
                }
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::Literal(Value::String(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expression::Literal(Value::Boolean(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expression::Literal(Value::Boolean(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Expression::Null)
            }
            Token::Identifier(name) => {
                self.advance();

                if self.match_token(&Token::Dot) {
                    self.advance();
                    let column = self.expect_identifier()?;
                    Ok(Expression::QualifiedColumn(name, column))
                } else if self.match_token(&Token::LeftParen) {
                    bail!("Function calls are not supported: {}", name)
                } else {
                    Ok(Expression::Column(name))
                }
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expr)
            }
            Token::Illegal(c) => bail!("Unexpected character '{}'", c),
            other => bail!("Unexpected token: {:?}", other),
        }
    }

    /// Parse list of expressions
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![];

        loop {
            expressions.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(expressions)
    }

    /// Parse list of identifiers
    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = vec![];

        loop {
            identifiers.push(self.expect_identifier()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    // Helper methods

    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    fn peek_token(&self) -> Token {
        self.tokens
            .get(self.position + 1)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    fn consume_not(&mut self) -> bool {
        if self.match_token(&Token::Not) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            bail!("Expected {:?}, found {:?}", token, self.current_token())
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.current_token() {
            Token::Eof => Ok(()),
            other => bail!("Unexpected trailing input: {:?}", other),
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => bail!("Expected identifier, found {:?}", other),
        }
    }

    fn expect_number(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Number(n) => {
                self.advance();
                Ok(n)
            }
            other => bail!("Expected number, found {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<Statement> {
        Parser::new(sql).parse()
    }

    #[test]
    fn test_parse_select_with_where_and_limit() -> Result<()> {
        let stmt = parse("SELECT id, age FROM people WHERE NOT (age > 0) LIMIT 1")?;
        match stmt {
            Statement::Select(select) => {
                assert_eq!(
                    select.projections,
                    vec![
                        SelectItem::Column("id".to_string()),
                        SelectItem::Column("age".to_string())
                    ]
                );
                assert_eq!(select.from, "people");
                assert_eq!(select.limit, Some(1));
                assert!(matches!(
                    select.where_clause,
                    Some(Expression::UnaryOp {
                        op: UnaryOperator::Not,
                        ..
                    })
                ));
            }
            _ => panic!("Expected SELECT statement"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_insert() -> Result<()> {
        let stmt = parse("INSERT INTO people (id, age) VALUES (1, 5), (2, -1);")?;
        match stmt {
            Statement::Insert(insert) => {
                assert_eq!(insert.table_name, "people");
                assert_eq!(
                    insert.columns,
                    Some(vec!["id".to_string(), "age".to_string()])
                );
                assert_eq!(insert.values.len(), 2);
                assert_eq!(insert.values[1][1], Expression::Literal(Value::Int32(-1)));
            }
            _ => panic!("Expected INSERT statement"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_update() -> Result<()> {
        let stmt = parse("UPDATE people SET age = age + 1, name = 'x' WHERE id = 3")?;
        match stmt {
            Statement::Update(update) => {
                assert_eq!(update.assignments.len(), 2);
                assert_eq!(update.assignments[0].column, "age");
                assert!(update.where_clause.is_some());
            }
            _ => panic!("Expected UPDATE statement"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_create_table_with_checks() -> Result<()> {
        let stmt = parse(
            "CREATE TABLE people (
                id INT,
                name VARCHAR(20),
                age INTEGER CHECK (age >= 0),
                active BOOL,
                CONSTRAINT adult CHECK (age > 17 OR NOT active),
                CHECK (name IS NOT NULL)
            )",
        )?;
        match stmt {
            Statement::CreateTable(create) => {
                assert_eq!(create.columns.len(), 4);
                assert_eq!(create.columns[1].data_type, DataType::Varchar(Some(20)));
                assert_eq!(create.columns[2].constraints.len(), 1);
                assert_eq!(create.constraints.len(), 2);
                match &create.constraints[0] {
                    TableConstraint::Check { name, expr } => {
                        assert_eq!(name.as_deref(), Some("adult"));
                        assert_eq!(expr.to_string(), "(age > 17) OR (NOT active)");
                    }
                }
            }
            _ => panic!("Expected CREATE TABLE statement"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_alter_table_add_check() -> Result<()> {
        let stmt = parse("ALTER TABLE people ADD CONSTRAINT positive CHECK (age > 0)")?;
        assert_eq!(
            stmt,
            Statement::AlterTable(AlterTableStatement {
                table_name: "people".to_string(),
                action: AlterTableAction::AddCheck {
                    name: Some("positive".to_string()),
                    expr: Expression::column("age").gt(Expression::literal(Value::Int32(0))),
                },
            })
        );

        let stmt = parse("ALTER TABLE people ADD CHECK (age < 200)")?;
        assert!(matches!(
            stmt,
            Statement::AlterTable(AlterTableStatement {
                action: AlterTableAction::AddCheck { name: None, .. },
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_parse_negated_in_and_between() -> Result<()> {
        let expr = Parser::parse_expression_text("kind NOT IN ('a', 'b')")?;
        assert!(matches!(expr, Expression::InList { negated: true, .. }));

        let expr = Parser::parse_expression_text("age NOT BETWEEN 1 AND 9")?;
        assert!(matches!(expr, Expression::Between { negated: true, .. }));

        let expr = Parser::parse_expression_text("NOT age BETWEEN 1 AND 9")?;
        assert!(matches!(
            expr,
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_parse_expression_text_errors() {
        assert!(Parser::parse_expression_text("age >").is_err());
        assert!(Parser::parse_expression_text("age > 0 0").is_err());
        assert!(Parser::parse_expression_text("(age > 0").is_err());
        assert!(Parser::parse_expression_text("age @ 1").is_err());
        assert!(Parser::parse_expression_text("length(name) > 0").is_err());
        assert!(Parser::parse_expression_text("").is_err());
    }

    #[test]
    fn test_display_round_trip() -> Result<()> {
        let sources = [
            "age > 0",
            "(a + b) * -c >= 10",
            "NOT ((x = 1) OR (y IS NULL))",
            "kind IN ('a', 'it''s') AND (n NOT BETWEEN -5 AND 5)",
            "people.age <> -(-3)",
            "\"order\" || 'x' = 'yx'",
        ];
        for source in sources {
            let expr = Parser::parse_expression_text(source)?;
            let reparsed = Parser::parse_expression_text(&expr.to_string())?;
            assert_eq!(expr, reparsed, "round trip of {}", source);
        }
        Ok(())
    }
}
