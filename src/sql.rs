// SQL module - SQL parsing and AST representation

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::{split_statements, Lexer};
pub use parser::Parser;
pub use token::*;
