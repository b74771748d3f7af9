//! Client-side values and the request/response contract
//!
//! These are the types crossing the mock-JDBC boundary: positional
//! parameter values, result rows, and per-statement responses. Column
//! metadata always comes from the catalog.

use serde::{Deserialize, Serialize};
use sql_catalog::SqlType;

/// A client-side SQL scalar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    /// 32-bit integer, the client-side width of SQL `integer`
    Int(i32),
    /// 64-bit integer, the client-side width of SQL `bigint`
    BigInt(i64),
    Text(String),
}

/// A result row, in catalog column order
pub type Row = Vec<SqlValue>;

/// One statement of a request batch: SQL text plus positional bindings
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRequest {
    pub sql: String,
    pub bindings: Vec<SqlValue>,
}

impl SqlRequest {
    /// A statement without bindings
    pub fn new(sql: impl Into<String>) -> Self {
        SqlRequest {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    /// A statement with positional bindings
    pub fn with_bindings(sql: impl Into<String>, bindings: Vec<SqlValue>) -> Self {
        SqlRequest {
            sql: sql.into(),
            bindings,
        }
    }
}

/// Column metadata in a result set
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub sql_type: SqlType,
}

/// An ordered result set with catalog-derived column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
}

/// The per-statement response: an update count and an optional result set
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResponse {
    pub update_count: usize,
    pub result: Option<ResultSet>,
}

impl SqlResponse {
    /// A write response carrying only an update count
    pub fn update(update_count: usize) -> Self {
        SqlResponse {
            update_count,
            result: None,
        }
    }

    /// A read response carrying a result set
    pub fn rows(result: ResultSet) -> Self {
        SqlResponse {
            update_count: 0,
            result: Some(result),
        }
    }
}
