//! DML dispatch runtime
//!
//! The client-facing half of the system: a restricted SQL surface
//! (`SELECT * FROM view`, `INSERT INTO t VALUES …`,
//! `DELETE FROM t WHERE pk = …`) executed over an engine handle. Writes
//! become engine commands inside a transaction; commits stream change
//! records that materialize view contents; reads serve the most recently
//! materialized snapshot.
//!
//! # Key components
//!
//! - [`DdlogProvider`]: per-batch transaction framing and statement
//!   dispatch
//! - [`codec`]: value conversion between client scalars and engine
//!   records, including the nullable wrapper convention
//! - [`MaterializedViews`]: concurrent, insertion-ordered per-table sets
//!   fed by the commit callback

pub mod codec;
mod provider;
mod value;
mod views;

pub use codec::CodecError;
pub use provider::DdlogProvider;
pub use value::{ColumnMeta, ResultSet, Row, SqlRequest, SqlResponse, SqlValue};
pub use views::MaterializedViews;

use ddlog_engine::EngineError;
use sql_catalog::CatalogError;

/// Errors raised by the DML runtime
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// Malformed client statement
    #[error("failed to parse statement {statement:?}: {message}")]
    Parse { statement: String, message: String },

    /// Syntactically valid but outside the supported statement shapes
    #[error("statement not supported: {0}")]
    Unsupported(String),

    /// Reference to a table the catalog does not know
    #[error("unknown table {0}")]
    UnknownTable(String),

    /// A DELETE equality names a column outside the primary key
    #[error("column {column} is not a primary key column of table {table}")]
    NotPrimaryKey { table: String, column: String },

    /// A DELETE predicate leaves a primary-key column unconstrained
    #[error("DELETE does not cover primary key column {column} of table {table}")]
    PkNotCovered { table: String, column: String },

    /// A DELETE predicate constrains the same primary-key column twice
    #[error("DELETE constrains primary key column {column} of table {table} more than once")]
    DuplicatePkPredicate { table: String, column: String },

    /// DELETE against a table without a primary key
    #[error("table {table} has no primary key")]
    NoPrimaryKey { table: String },

    /// An INSERT row does not match the table's column count
    #[error("row has {found} values but table {table} has {expected} columns")]
    Arity {
        table: String,
        expected: usize,
        found: usize,
    },

    /// A placeholder had no positional binding left to consume
    #[error("statement requires more bindings than were supplied")]
    MissingBinding,

    /// Value conversion failure
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Catalog construction failure at initialization
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Engine failure, propagated with context
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// A rollback failed; the dispatcher cannot continue
    #[error("transaction rollback failed: {0}")]
    RollbackFailed(EngineError),

    /// The change stream delivered a command kind that cannot appear
    /// post-commit
    #[error("did not expect a DeleteKey change for relation {relation}")]
    UnexpectedChange { relation: String },

    /// A change record does not match its table's field layout
    #[error("change for relation {0} does not match its table layout")]
    MalformedChange(String),

    /// Internal invariant violation
    #[error("invariant violation: {0}")]
    Invariant(String),
}
