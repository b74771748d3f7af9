//! IR expressions
//!
//! Expressions appear in rule bodies (filters and assignment bindings) and
//! as the row expressions of atoms. The two row-variable forms are distinct
//! variants: `Var` is a use-site reference, `VarDecl` is the single binding
//! site. Keeping them as separate constructors (rather than a flag) means a
//! second declaration cannot be produced by accident.

use crate::{Symbol, Type};
use internment::Intern;
use std::fmt;

/// An expression in the relational IR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Use-site reference to a variable
    Var { name: Symbol, ty: Type },
    /// Declaration-site binding of a variable (`var v`)
    VarDecl { name: Symbol, ty: Type },
    /// Struct constructor: `Tname{.f1 = e1, …}`
    Struct {
        ty_name: Symbol,
        fields: Vec<FieldValue>,
        ty: Type,
    },
    /// Assignment binding: `lhs = rhs`, used as a condition fragment
    Set { lhs: Box<Expr>, rhs: Box<Expr> },
    /// Field access: `v.f`
    Field {
        var: Box<Expr>,
        field: Symbol,
        ty: Type,
    },
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// String literal
    Str(String),
    /// Binary operation
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Logical negation
    Not(Box<Expr>),
}

/// A named field value inside a struct constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub name: Symbol,
    pub value: Expr,
}

impl FieldValue {
    /// Create a new field value
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        FieldValue {
            name: Intern::new(name.into()),
            value,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl Expr {
    /// Use-site variable reference
    pub fn var(name: Symbol, ty: Type) -> Self {
        Expr::Var { name, ty }
    }

    /// Declaration-site variable binding
    pub fn var_decl(name: Symbol, ty: Type) -> Self {
        Expr::VarDecl { name, ty }
    }

    /// Assignment binding
    pub fn set(lhs: Expr, rhs: Expr) -> Self {
        Expr::Set {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// The derived type of this expression.
    ///
    /// Literals carry their natural types (integer literals are
    /// `signed<64>`, matching the lowering of SQL `integer`); comparisons,
    /// logical operators, and assignment bindings are conditions of type
    /// bool.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Var { ty, .. } | Expr::VarDecl { ty, .. } => ty.clone(),
            Expr::Struct { ty, .. } => ty.clone(),
            Expr::Field { ty, .. } => ty.clone(),
            Expr::Bool(_) => Type::Bool,
            Expr::Int(_) => Type::signed64(),
            Expr::Str(_) => Type::String,
            Expr::Set { .. } | Expr::BinaryOp { .. } | Expr::Not(_) => Type::Bool,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var { name, .. } => write!(f, "{}", name),
            Expr::VarDecl { name, .. } => write!(f, "var {}", name),
            Expr::Struct {
                ty_name, fields, ..
            } => {
                write!(f, "{}{{", ty_name)?;
                for (i, fv) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, ".{} = {}", fv.name, fv.value)?;
                }
                write!(f, "}}")
            }
            Expr::Set { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Expr::Field { var, field, .. } => write!(f, "{}.{}", var, field),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Int(i) => write!(f, "{}", i),
            Expr::Str(s) => write!(f, "{:?}", s),
            Expr::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Not(e) => write!(f, "not {}", e),
        }
    }
}
