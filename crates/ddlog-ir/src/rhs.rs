//! Partially-constructed query bodies
//!
//! `RelationRhs` is the central in-translation object: a row variable, the
//! row's type, and the body fragments accumulated so far. The row variable
//! has exactly one declaration site; `declare_row` hands out the
//! `Expr::VarDecl` form at most once and every later access goes through
//! `row_ref`.

use crate::{Expr, IrError, RuleRhs, Symbol, Type};

/// A partial query producing rows of `row_type`, named by `row_var`
#[derive(Debug, Clone)]
pub struct RelationRhs {
    row_var: Symbol,
    row_type: Type,
    fragments: Vec<RuleRhs>,
    declared: bool,
}

impl RelationRhs {
    /// Create a new partial query with no fragments
    pub fn new(row_var: Symbol, row_type: Type) -> Self {
        RelationRhs {
            row_var,
            row_type,
            fragments: Vec::new(),
            declared: false,
        }
    }

    /// The row variable name
    pub fn row_var(&self) -> Symbol {
        self.row_var
    }

    /// The row type
    pub fn row_type(&self) -> &Type {
        &self.row_type
    }

    /// Use-site reference to the row variable
    pub fn row_ref(&self) -> Expr {
        Expr::var(self.row_var, self.row_type.clone())
    }

    /// Declaration-site binding of the row variable. May be taken at most
    /// once; a second request is an invariant violation.
    pub fn declare_row(&mut self) -> Result<Expr, IrError> {
        if self.declared {
            return Err(IrError::RowAlreadyDeclared(self.row_var));
        }
        self.declared = true;
        Ok(Expr::var_decl(self.row_var, self.row_type.clone()))
    }

    /// Append a body fragment
    pub fn push(&mut self, fragment: RuleRhs) {
        self.fragments.push(fragment);
    }

    /// Append a condition fragment, returning the builder
    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.fragments.push(RuleRhs::Condition(condition));
        self
    }

    /// The accumulated fragments
    pub fn fragments(&self) -> &[RuleRhs] {
        &self.fragments
    }

    /// Consume the builder, yielding the accumulated fragments
    pub fn into_fragments(self) -> Vec<RuleRhs> {
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use internment::Intern;

    fn sym(s: &str) -> Symbol {
        Intern::new(s.to_string())
    }

    #[test]
    fn test_row_ref_is_a_use_site() {
        let rhs = RelationRhs::new(sym("v0"), Type::user("Thosts"));
        assert_eq!(rhs.row_ref(), Expr::var(sym("v0"), Type::user("Thosts")));
    }

    #[test]
    fn test_declare_row_only_once() {
        let mut rhs = RelationRhs::new(sym("v0"), Type::user("Thosts"));
        let decl = rhs.declare_row().unwrap();
        assert_eq!(decl, Expr::var_decl(sym("v0"), Type::user("Thosts")));
        assert!(matches!(
            rhs.declare_row(),
            Err(IrError::RowAlreadyDeclared(_))
        ));
    }

    #[test]
    fn test_fragments_accumulate_in_order() {
        let ty = Type::user("Thosts");
        let rhs = RelationRhs::new(sym("v0"), ty.clone())
            .with_condition(Expr::Bool(true))
            .with_condition(Expr::Bool(false));
        assert_eq!(
            rhs.fragments(),
            &[
                RuleRhs::Condition(Expr::Bool(true)),
                RuleRhs::Condition(Expr::Bool(false)),
            ]
        );
    }
}
