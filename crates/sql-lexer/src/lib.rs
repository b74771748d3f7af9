//! SQL Lexer using Chumsky
//!
//! This crate provides lexical analysis for SQL statements, converting raw
//! SQL text into a stream of spanned tokens. The same token stream feeds
//! both the DDL dialect parser (`sql-parser`) and the client statement
//! dialect parser (`dml-parser`).

mod lexer;
mod span;
mod token;

pub use lexer::lexer;
pub use span::Span;
pub use token::{Keyword, Token};

/// Result of lexing - either a list of spanned tokens or errors
pub type LexResult = Result<Vec<(Token, Span)>, Vec<LexError>>;

/// A lexical error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}
