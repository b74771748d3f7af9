//! Client statement dialect parser
//!
//! The second of the system's two SQL dialects: the restricted statement set
//! a client connection may execute at request time (`SELECT * FROM v`,
//! `INSERT INTO t VALUES …`, `DELETE FROM t WHERE pk = …`), with `?`
//! positional placeholders. The DML dispatcher parses every incoming
//! statement with this crate and dispatches on the root statement kind.

pub mod ast;
pub mod parser;

// Re-export AST types
pub use ast::*;

// Re-export parser types
pub use parser::{parse, ParseError, ParseResult};
