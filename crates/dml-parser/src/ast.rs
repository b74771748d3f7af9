//! Abstract Syntax Tree for the client statement dialect
//!
//! The second dialect: the statements a client connection may execute at
//! request time. Statements can carry `?` placeholders that are satisfied
//! from the request's positional bindings.

/// A client statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// SELECT statement
    Select(SelectStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// DELETE statement
    Delete(DeleteStatement),
}

/// SELECT statement: the runtime only serves `SELECT * FROM t`, but the
/// item list is kept so unsupported shapes are rejected by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub items: Vec<SelectItem>,
    pub table: String,
}

/// An item in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// All columns (*)
    Star,
    /// A named column
    Column(String),
}

/// INSERT statement with one or more parenthesized rows
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub rows: Vec<Vec<Expr>>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<Expr>,
}

/// An expression in a client statement
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Positional parameter (?)
    Placeholder,
    /// Column reference
    Column(String),
    /// Integer literal
    Integer(i64),
    /// String literal
    String(String),
    /// Boolean literal
    Boolean(bool),
    /// NULL literal
    Null,
    /// Binary operation
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}
