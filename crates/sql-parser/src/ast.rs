//! Abstract Syntax Tree for the DDL dialect
//!
//! This is the first of the two dialects: the one schemas and views are
//! written in. It covers `CREATE TABLE`, `CREATE VIEW … AS SELECT …` and the
//! query bodies views are defined with. Constructs that are parsed but not
//! translatable (`ORDER BY`, `LIMIT`, non-`DISTINCT` selects, …) are kept in
//! the tree so the translator can reject them by name.

/// A DDL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// CREATE VIEW statement
    CreateView(CreateViewStatement),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Declared SQL column types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    Integer,
    Bigint,
    /// VARCHAR with optional declared length
    Varchar(Option<u32>),
}

/// Table constraint
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    /// PRIMARY KEY (c1, c2, …) — column order is the pk declaration order
    PrimaryKey { columns: Vec<String> },
}

/// CREATE VIEW statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    pub name: String,
    pub query: SelectStatement,
}

/// A SELECT query body
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub with: Option<WithCte>,
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<Expr>,
    pub limit: Option<i64>,
}

/// A single `WITH name AS (query)` prefix. Parsed so the translator can
/// reject it with a named error rather than a generic parse failure.
#[derive(Debug, Clone, PartialEq)]
pub struct WithCte {
    pub name: String,
    pub query: Box<SelectStatement>,
}

/// An item in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// All columns (*)
    Star,
    /// A single expression with optional alias
    Expr { expr: Expr, alias: Option<String> },
}

/// A FROM clause source
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    /// Named table or view
    Table(String),
    /// Parenthesized subquery
    Subquery(Box<SelectStatement>),
}

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference, optionally qualified (`t.c`)
    Column {
        qualifier: Option<String>,
        name: String,
    },
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
    /// Logical negation
    Not(Box<Expr>),
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

impl Expr {
    /// The unqualified column name, if this expression is a plain or dotted
    /// identifier. Used to derive projection field names.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Expr::Column { name, .. } => Some(name),
            _ => None,
        }
    }
}
