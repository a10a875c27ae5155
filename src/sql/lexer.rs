// SQL lexer - tokenizes SQL statements

use super::token::Token;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let ch = match self.current_char {
            Some(ch) => ch,
            None => return Token::Eof,
        };

        match ch {
            '+' => {
                self.advance();
                Token::Plus
            }
            '-' => {
                self.advance();
                if self.current_char == Some('-') {
                    self.skip_comment();
                    return self.next_token();
                }
                Token::Minus
            }
            '*' => {
                self.advance();
                Token::Star
            }
            '/' => {
                self.advance();
                Token::Slash
            }
            '%' => {
                self.advance();
                Token::Percent
            }
            '|' => {
                self.advance();
                if self.current_char == Some('|') {
                    self.advance();
                    Token::Concat
                } else {
                    Token::Illegal('|')
                }
            }
            '=' => {
                self.advance();
                Token::Equal
            }
            '<' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::LessEqual
                } else if self.current_char == Some('>') {
                    self.advance();
                    Token::NotEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '!' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::NotEqual
                } else {
                    Token::Illegal('!')
                }
            }
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            ';' => {
                self.advance();
                Token::Semicolon
            }
            '.' => {
                self.advance();
                Token::Dot
            }
            '\'' => self.read_string(),
            '"' => self.read_quoted_identifier(),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            other => {
                self.advance();
                Token::Illegal(other)
            }
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comments starting with --
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a quoted identifier (e.g., "table name")
    fn read_quoted_identifier(&mut self) -> Token {
        self.advance(); // Skip opening quote
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch == '"' {
                if self.peek() == Some('"') {
                    identifier.push('"');
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else {
                identifier.push(ch);
                self.advance();
            }
        }

        Token::Identifier(identifier)
    }

    /// Read a string literal
    fn read_string(&mut self) -> Token {
        self.advance(); // Skip opening quote
        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == '\'' {
                if self.peek() == Some('\'') {
                    // Escaped single quote
                    string.push('\'');
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Token::String(string)
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(number)
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        tokens
    }
}

/// Split a script into statements on `;`, ignoring semicolons inside string
/// literals, quoted identifiers and `--` comments. Empty statements are dropped.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '-' if chars.peek() == Some(&'-') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            current.push('\n');
                            break;
                        }
                    }
                }
                ';' => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }

    let stmt = current.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let mut lexer = Lexer::new("SELECT * FROM people");
        assert_eq!(lexer.next_token(), Token::Select);
        assert_eq!(lexer.next_token(), Token::Star);
        assert_eq!(lexer.next_token(), Token::From);
        assert_eq!(lexer.next_token(), Token::Identifier("people".to_string()));
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("+ - * / % = < > <= >= <> != ||");
        assert_eq!(lexer.next_token(), Token::Plus);
        assert_eq!(lexer.next_token(), Token::Minus);
        assert_eq!(lexer.next_token(), Token::Star);
        assert_eq!(lexer.next_token(), Token::Slash);
        assert_eq!(lexer.next_token(), Token::Percent);
        assert_eq!(lexer.next_token(), Token::Equal);
        assert_eq!(lexer.next_token(), Token::Less);
        assert_eq!(lexer.next_token(), Token::Greater);
        assert_eq!(lexer.next_token(), Token::LessEqual);
        assert_eq!(lexer.next_token(), Token::GreaterEqual);
        assert_eq!(lexer.next_token(), Token::NotEqual);
        assert_eq!(lexer.next_token(), Token::NotEqual);
        assert_eq!(lexer.next_token(), Token::Concat);
    }

    #[test]
    fn test_string_literals() {
        let mut lexer = Lexer::new("'hello world' 'it''s fine' 'héllo'");
        assert_eq!(lexer.next_token(), Token::String("hello world".to_string()));
        assert_eq!(lexer.next_token(), Token::String("it's fine".to_string()));
        assert_eq!(lexer.next_token(), Token::String("héllo".to_string()));
    }

    #[test]
    fn test_illegal_characters() {
        let mut lexer = Lexer::new("age @ 1");
        assert_eq!(lexer.next_token(), Token::Identifier("age".to_string()));
        assert_eq!(lexer.next_token(), Token::Illegal('@'));
        assert_eq!(lexer.next_token(), Token::Number("1".to_string()));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("age -- comment\n> 0");
        assert_eq!(lexer.next_token(), Token::Identifier("age".to_string()));
        assert_eq!(lexer.next_token(), Token::Greater);
        assert_eq!(lexer.next_token(), Token::Number("0".to_string()));
    }

    #[test]
    fn test_check_clause_tokens() {
        let tokens = Lexer::new("CHECK (age BETWEEN 0 AND 150)").tokenize();
        assert_eq!(
            tokens,
            vec![
                Token::Check,
                Token::LeftParen,
                Token::Identifier("age".to_string()),
                Token::Between,
                Token::Number("0".to_string()),
                Token::And,
                Token::Number("150".to_string()),
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_split_statements() {
        let script = "INSERT INTO t VALUES ('a;b'); -- trailing; comment\nSELECT * FROM t;;";
        let statements = split_statements(script);
        assert_eq!(
            statements,
            vec![
                "INSERT INTO t VALUES ('a;b')".to_string(),
                "SELECT * FROM t".to_string(),
            ]
        );
    }
}
