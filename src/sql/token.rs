// SQL tokens for lexical analysis

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Number(String),
    String(String),

    // Keywords
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Create,
    Table,
    Alter,
    Add,
    Constraint,
    Check,
    And,
    Or,
    Not,
    Null,
    Is,
    In,
    Between,
    True,
    False,
    Limit,

    // Data types
    Int,
    Integer,
    Varchar,
    Text,
    Boolean,
    Bool,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,

    // Special
    Illegal(char),
    Eof,
}

impl Token {
    /// Check if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            Token::Identifier(_)
                | Token::Number(_)
                | Token::String(_)
                | Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Percent
                | Token::Concat
                | Token::Equal
                | Token::NotEqual
                | Token::Less
                | Token::Greater
                | Token::LessEqual
                | Token::GreaterEqual
                | Token::LeftParen
                | Token::RightParen
                | Token::Comma
                | Token::Semicolon
                | Token::Dot
                | Token::Illegal(_)
                | Token::Eof
        )
    }

    /// Convert a string to a keyword token if it matches
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "SELECT" => Some(Token::Select),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),
            "INSERT" => Some(Token::Insert),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "UPDATE" => Some(Token::Update),
            "SET" => Some(Token::Set),
            "CREATE" => Some(Token::Create),
            "TABLE" => Some(Token::Table),
            "ALTER" => Some(Token::Alter),
            "ADD" => Some(Token::Add),
            "CONSTRAINT" => Some(Token::Constraint),
            "CHECK" => Some(Token::Check),
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "NULL" => Some(Token::Null),
            "IS" => Some(Token::Is),
            "IN" => Some(Token::In),
            "BETWEEN" => Some(Token::Between),
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),
            "LIMIT" => Some(Token::Limit),
            "INT" => Some(Token::Int),
            "INTEGER" => Some(Token::Integer),
            "VARCHAR" => Some(Token::Varchar),
            "TEXT" => Some(Token::Text),
            "BOOLEAN" => Some(Token::Boolean),
            "BOOL" => Some(Token::Bool),
            _ => None,
        }
    }
}
