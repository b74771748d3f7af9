//! Query body compilation
//!
//! Compiles `SELECT DISTINCT <items> FROM <src> [WHERE <expr>]` into a
//! [`RelationRhs`]: a row variable, a row type, and the accumulated body
//! fragments. Everything outside that shape is rejected with an error
//! naming the construct.

use crate::context::{sym, TranslationContext};
use crate::TranslationError;
use ddlog_ir::{
    type_name, Atom, Expr, Field, FieldValue, Relation, RelationRhs, RelationRole, Rule, RuleRhs,
    Type, TypeDef,
};
use sql_parser::{FromClause, SelectItem, SelectStatement};
use std::collections::HashSet;

/// Compile a query body to a partial query over the current context
pub fn compile_select(
    ctx: &mut TranslationContext,
    query: &SelectStatement,
) -> Result<RelationRhs, TranslationError> {
    if let Some(with) = &query.with {
        return Err(TranslationError::unsupported("WITH clauses", with));
    }
    if let Some(limit) = &query.limit {
        return Err(TranslationError::unsupported("LIMIT clauses", limit));
    }
    if !query.order_by.is_empty() {
        return Err(TranslationError::unsupported(
            "ORDER BY clauses",
            &query.order_by,
        ));
    }

    let from = query
        .from
        .as_ref()
        .ok_or_else(|| TranslationError::unsupported("SELECT without a FROM clause", query))?;
    let mut rhs = compile_from(ctx, from)?;

    if let Some(predicate) = &query.where_clause {
        let condition = ctx.translate_expression(predicate)?;
        rhs = rhs.with_condition(condition);
    }

    let result = compile_projection(ctx, rhs, query)?;
    // The scope introduced by the FROM source lives for the duration of
    // this query body's compilation.
    ctx.exit_scope();
    Ok(result)
}

/// Compile a FROM source into the partial query it contributes
fn compile_from(
    ctx: &mut TranslationContext,
    from: &FromClause,
) -> Result<RelationRhs, TranslationError> {
    match from {
        FromClause::Table(name) => {
            let relation = ctx.get_relation(name)?.clone();
            let var = sym(ctx.fresh_local("v"));
            ctx.enter_scope(var, relation.ty.clone());
            let mut rhs = RelationRhs::new(var, relation.ty.clone());
            let row_ref = rhs.row_ref();
            rhs.push(RuleRhs::Literal(Atom::new(relation.name, row_ref)));
            Ok(rhs)
        }
        FromClause::Subquery(inner) => {
            let inner = compile_select(ctx, inner)?;
            let row_type = inner.row_type().clone();

            // Materialize the subquery through a fresh internal relation
            // with its own binding rule, then re-enter through a fresh
            // variable.
            let rel_name = sym(ctx.fresh_global("tmp"));
            ctx.add_relation(
                None,
                Relation::new(RelationRole::Internal, rel_name.to_string(), row_type.clone()),
            )?;

            let var = sym(ctx.fresh_local("v"));
            let var_ref = Expr::var(var, row_type.clone());
            let inner_ref = inner.row_ref();
            let mut body = inner.into_fragments();
            body.push(RuleRhs::Condition(Expr::set(
                Expr::var_decl(var, row_type.clone()),
                inner_ref,
            )));
            ctx.add_rule(Rule::new(Atom::new(rel_name, var_ref.clone()), body));

            ctx.enter_scope(var, row_type.clone());
            let mut rhs = RelationRhs::new(var, row_type);
            rhs.push(RuleRhs::Literal(Atom::new(rel_name, var_ref)));
            Ok(rhs)
        }
    }
}

/// Apply the SELECT projection to a compiled source
fn compile_projection(
    ctx: &mut TranslationContext,
    rhs: RelationRhs,
    query: &SelectStatement,
) -> Result<RelationRhs, TranslationError> {
    if !query.distinct {
        return Err(TranslationError::unsupported("non-DISTINCT SELECT", query));
    }

    // Special case: a pure `SELECT *` passes the source through unchanged
    if query.items.len() == 1 && query.items[0] == SelectItem::Star {
        return Ok(rhs);
    }

    let mut type_fields = Vec::new();
    let mut field_values = Vec::new();
    let mut seen = HashSet::new();
    for item in &query.items {
        match item {
            SelectItem::Star => {
                return Err(TranslationError::unsupported(
                    "`*` mixed with other select items",
                    query,
                ))
            }
            SelectItem::Expr { expr, alias } => {
                // Field name precedence: explicit alias, the identifier's
                // own name, then a fresh synthetic column name.
                let name = match (alias, expr.column_name()) {
                    (Some(alias), _) => alias.clone(),
                    (None, Some(column)) => column.to_lowercase(),
                    (None, None) => ctx.fresh_local("col"),
                };
                if !seen.insert(name.to_lowercase()) {
                    return Err(TranslationError::DuplicateProjection { name });
                }
                let value = ctx.translate_expression(expr)?;
                type_fields.push(Field::new(name.clone(), value.ty()));
                field_values.push(FieldValue::new(name, value));
            }
        }
    }

    let rel_name = ctx.fresh_global("tmp");
    let ty_name = type_name(&rel_name);
    ctx.add_typedef(TypeDef::new(ty_name.clone(), Type::Struct(type_fields)))?;
    let row_type = Type::user(ty_name.clone());
    ctx.add_relation(
        None,
        Relation::new(RelationRole::Internal, rel_name, row_type.clone()),
    )?;

    let project = Expr::Struct {
        ty_name: sym(ty_name),
        fields: field_values,
        ty: row_type.clone(),
    };

    let var = sym(ctx.fresh_local("v"));
    let mut result = RelationRhs::new(var, row_type);
    for fragment in rhs.into_fragments() {
        result.push(fragment);
    }
    let decl = result.declare_row()?;
    Ok(result.with_condition(Expr::set(decl, project)))
}
