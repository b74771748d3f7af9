//! Translation context
//!
//! A single owned value threaded through compilation: the program
//! accumulator, the registries of declared type-defs and relations, the
//! fresh-name generators, and the scope stack row variables resolve
//! against. Global names (`tmp`) are unique for the lifetime of the
//! context; local names (`v`, `col`) and scopes reset per top-level
//! statement.

use crate::TranslationError;
use ddlog_ir::{
    Declaration, Expr, Field, Program, Relation, Rule, Symbol, Type, TypeDef,
};
use internment::Intern;
use std::collections::{HashMap, HashSet};

/// A scope entry: a live row variable and its row type
#[derive(Debug, Clone)]
pub struct Scope {
    pub row_var: Symbol,
    pub row_type: Type,
}

/// The state threaded through one translation run
#[derive(Debug, Default)]
pub struct TranslationContext {
    program: Program,
    /// Emitted type-def and relation names, for collision detection
    names: HashSet<Symbol>,
    typedefs: HashMap<Symbol, TypeDef>,
    /// SQL-visible relations, keyed by canonical (upper-case) SQL name
    relations: HashMap<String, Relation>,
    global_counters: HashMap<&'static str, usize>,
    local_counters: HashMap<&'static str, usize>,
    scopes: Vec<Scope>,
}

impl TranslationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the context, yielding the accumulated program
    pub fn into_program(self) -> Program {
        self.program
    }

    /// Register a type-def and append it to the program
    pub fn add_typedef(&mut self, tdef: TypeDef) -> Result<(), TranslationError> {
        if !self.names.insert(tdef.name) {
            return Err(TranslationError::DuplicateDeclaration(tdef.name.to_string()));
        }
        self.typedefs.insert(tdef.name, tdef.clone());
        self.program.add(Declaration::TypeDef(tdef));
        Ok(())
    }

    /// Register a relation and append it to the program. `sql_name` is the
    /// name the relation is visible under in SQL (`FROM` clauses); internal
    /// relations pass `None`.
    pub fn add_relation(
        &mut self,
        sql_name: Option<&str>,
        relation: Relation,
    ) -> Result<(), TranslationError> {
        if !self.names.insert(relation.name) {
            return Err(TranslationError::DuplicateDeclaration(
                relation.name.to_string(),
            ));
        }
        if let Some(sql_name) = sql_name {
            self.relations
                .insert(sql_name.to_uppercase(), relation.clone());
        }
        self.program.add(Declaration::Relation(relation));
        Ok(())
    }

    /// Append a rule to the program
    pub fn add_rule(&mut self, rule: Rule) {
        self.program.add(Declaration::Rule(rule));
    }

    /// Look up a SQL-visible relation by case-insensitive name
    pub fn get_relation(&self, sql_name: &str) -> Result<&Relation, TranslationError> {
        self.relations
            .get(&sql_name.to_uppercase())
            .ok_or_else(|| TranslationError::UnknownRelation {
                name: sql_name.to_string(),
            })
    }

    /// Fresh name in the global namespace (`tmp0`, `tmp1`, …)
    pub fn fresh_global(&mut self, prefix: &'static str) -> String {
        let counter = self.global_counters.entry(prefix).or_insert(0);
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        name
    }

    /// Fresh name in the per-statement local namespace (`v0`, `col0`, …)
    pub fn fresh_local(&mut self, prefix: &'static str) -> String {
        let counter = self.local_counters.entry(prefix).or_insert(0);
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        name
    }

    /// Reset per-statement state: local name counters and the scope stack
    pub fn reset_local(&mut self) {
        self.local_counters.clear();
        self.scopes.clear();
    }

    /// Push a scope for a row variable
    pub fn enter_scope(&mut self, row_var: Symbol, row_type: Type) {
        self.scopes.push(Scope { row_var, row_type });
    }

    /// Pop the innermost scope
    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Resolve a row type to its struct fields, following `User` references
    pub fn resolve_struct<'a>(&'a self, ty: &'a Type) -> Result<&'a [Field], TranslationError> {
        match ty {
            Type::Struct(fields) => Ok(fields),
            Type::User(name) => match self.typedefs.get(name).map(|t| &t.ty) {
                Some(Type::Struct(fields)) => Ok(fields),
                _ => Err(TranslationError::UnresolvedType(name.to_string())),
            },
            other => Err(TranslationError::UnresolvedType(other.to_string())),
        }
    }

    /// Resolve an unqualified column against the scope stack, innermost
    /// scope first
    fn resolve_column(&self, name: &str) -> Result<Expr, TranslationError> {
        for scope in self.scopes.iter().rev() {
            let fields = self.resolve_struct(&scope.row_type)?;
            if let Some(field) = fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)) {
                return Ok(Expr::Field {
                    var: Box::new(Expr::var(scope.row_var, scope.row_type.clone())),
                    field: field.name,
                    ty: field.ty.clone(),
                });
            }
        }
        Err(TranslationError::UnknownColumn {
            name: name.to_string(),
        })
    }

    /// Translate a scalar expression against the current scopes, producing
    /// a typed IR expression. Literals fold to typed IR literals.
    pub fn translate_expression(
        &self,
        expr: &sql_parser::Expr,
    ) -> Result<Expr, TranslationError> {
        match expr {
            sql_parser::Expr::Column { name, .. } => self.resolve_column(name),
            sql_parser::Expr::Integer(n) => Ok(Expr::Int(*n)),
            sql_parser::Expr::String(s) => Ok(Expr::Str(s.clone())),
            sql_parser::Expr::Boolean(b) => Ok(Expr::Bool(*b)),
            sql_parser::Expr::Null => {
                Err(TranslationError::unsupported("NULL literals", expr))
            }
            sql_parser::Expr::BinaryOp { left, op, right } => {
                let left = self.translate_expression(left)?;
                let right = self.translate_expression(right)?;
                Ok(Expr::BinaryOp {
                    left: Box::new(left),
                    op: translate_binop(*op),
                    right: Box::new(right),
                })
            }
            sql_parser::Expr::Not(inner) => {
                Ok(Expr::Not(Box::new(self.translate_expression(inner)?)))
            }
        }
    }
}

/// Map a SQL binary operator to its IR counterpart
fn translate_binop(op: sql_parser::BinaryOp) -> ddlog_ir::BinaryOp {
    match op {
        sql_parser::BinaryOp::Eq => ddlog_ir::BinaryOp::Eq,
        sql_parser::BinaryOp::NotEq => ddlog_ir::BinaryOp::Neq,
        sql_parser::BinaryOp::Lt => ddlog_ir::BinaryOp::Lt,
        sql_parser::BinaryOp::LtEq => ddlog_ir::BinaryOp::Lte,
        sql_parser::BinaryOp::Gt => ddlog_ir::BinaryOp::Gt,
        sql_parser::BinaryOp::GtEq => ddlog_ir::BinaryOp::Gte,
        sql_parser::BinaryOp::And => ddlog_ir::BinaryOp::And,
        sql_parser::BinaryOp::Or => ddlog_ir::BinaryOp::Or,
    }
}

/// Intern a string as a symbol
pub(crate) fn sym(s: impl Into<String>) -> Symbol {
    Intern::new(s.into())
}
