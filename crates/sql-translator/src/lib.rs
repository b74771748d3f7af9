//! SQL-to-IR translator
//!
//! Compiles the initialization DDL (first dialect) into the relational IR:
//! `CREATE TABLE` statements become struct type-defs plus input relations,
//! `CREATE VIEW` statements compile their query bodies in a row-variable
//! calculus and emit output relations with binding rules.
//!
//! The entry point is [`translate_ddl`], which runs every statement through
//! a single owned [`TranslationContext`] and yields the emitted [`Program`].

mod context;
mod ddl;
mod error;
mod query;

pub use context::{Scope, TranslationContext};
pub use ddl::translate_statement;
pub use error::TranslationError;

use ddlog_ir::Program;
use tracing::debug;

/// Translate an ordered list of DDL statements into a program.
///
/// The same list must also be handed to the metadata catalog; the two
/// passes agree on field orderings and naming.
pub fn translate_ddl<S: AsRef<str>>(statements: &[S]) -> Result<Program, TranslationError> {
    let mut ctx = TranslationContext::new();
    for sql in statements {
        let sql = sql.as_ref();
        let statement = sql_parser::parse(sql).map_err(|errs| TranslationError::Parse {
            statement: sql.to_string(),
            message: errs
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "unknown parse error".to_string()),
        })?;
        translate_statement(&mut ctx, &statement)?;
    }
    let program = ctx.into_program();
    debug!(declarations = program.declarations.len(), "DDL translated");
    Ok(program)
}
