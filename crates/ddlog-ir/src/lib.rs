//! Typed relational IR
//!
//! The intermediate representation the SQL DDL compiles into: scalar and
//! struct types, type-defs, relations with input/internal/output roles,
//! atoms, rule fragments, rules, and the expressions appearing in rule
//! bodies. The emitted [`Program`] renders to the engine's source syntax
//! via `Display`.
//!
//! # Key components
//!
//! - **Type / TypeDef**: the closed type variant and named struct bindings
//! - **Relation**: named, typed, role-tagged relations
//! - **Rule / RuleRhs / Atom**: `head :- body` with literal and condition
//!   fragments
//! - **Expr**: row variables (use-site and declaration-site forms), struct
//!   constructors, assignments, literals, field accesses
//! - **RelationRhs**: the in-translation builder for partial query bodies

mod expr;
mod program;
mod rhs;
mod types;

use internment::Intern;

/// Interned string for efficient storage and comparison
pub type Symbol = Intern<String>;

pub use expr::{BinaryOp, Expr, FieldValue};
pub use program::{Atom, Declaration, Program, Relation, RelationRole, Rule, RuleRhs};
pub use rhs::RelationRhs;
pub use types::{relation_name, relation_to_table, type_name, Field, Type, TypeDef};

/// Invariant violations in IR construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// The row variable of a `RelationRhs` was declared a second time
    #[error("row variable {0} is already declared")]
    RowAlreadyDeclared(Symbol),
}
