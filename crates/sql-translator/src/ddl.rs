//! DDL translation
//!
//! `CREATE TABLE` becomes a struct type-def plus an input relation;
//! `CREATE VIEW` compiles its query body and emits an output relation with
//! a binding rule.

use crate::context::{sym, TranslationContext};
use crate::{query, TranslationError};
use ddlog_ir::{
    relation_name, type_name, Atom, Expr, Field, Relation, RelationRole, Rule, RuleRhs, Type,
    TypeDef,
};
use sql_parser::{CreateTableStatement, CreateViewStatement, SqlType, Statement};
use tracing::debug;

/// Translate one parsed DDL statement into the context's program
pub fn translate_statement(
    ctx: &mut TranslationContext,
    statement: &Statement,
) -> Result<(), TranslationError> {
    // Local names and scopes are per-statement
    ctx.reset_local();
    match statement {
        Statement::CreateTable(create) => translate_create_table(ctx, create),
        Statement::CreateView(create) => translate_create_view(ctx, create),
    }
}

/// Lower a declared SQL column type to its IR type
fn lower_type(sql_type: &SqlType) -> Type {
    match sql_type {
        SqlType::Boolean => Type::Bool,
        SqlType::Integer => Type::signed64(),
        SqlType::Bigint => Type::BigInt,
        SqlType::Varchar(_) => Type::String,
    }
}

fn translate_create_table(
    ctx: &mut TranslationContext,
    create: &CreateTableStatement,
) -> Result<(), TranslationError> {
    debug!(table = %create.name, "translating CREATE TABLE");

    let ty_name = type_name(&create.name);
    let mut fields = Vec::with_capacity(create.columns.len());
    for column in &create.columns {
        if fields
            .iter()
            .any(|f: &Field| f.name.as_str() == column.name)
        {
            return Err(TranslationError::DuplicateField {
                ty: ty_name,
                field: column.name.clone(),
            });
        }
        fields.push(Field::new(column.name.clone(), lower_type(&column.data_type)));
    }

    let tdef = TypeDef::new(ty_name.clone(), Type::Struct(fields));
    ctx.add_typedef(tdef)?;
    ctx.add_relation(
        Some(&create.name),
        Relation::new(
            RelationRole::Input,
            relation_name(&create.name),
            Type::user(ty_name),
        ),
    )
}

fn translate_create_view(
    ctx: &mut TranslationContext,
    create: &CreateViewStatement,
) -> Result<(), TranslationError> {
    debug!(view = %create.name, "translating CREATE VIEW");

    let rhs = query::compile_select(ctx, &create.query)?;
    let row_type = rhs.row_type().clone();

    ctx.add_relation(
        Some(&create.name),
        Relation::new(RelationRole::Output, create.name.clone(), row_type.clone()),
    )?;

    // Bind a fresh output row variable to the compiled row reference and
    // head the rule with it.
    let out_var = sym(ctx.fresh_local("v"));
    let out_decl = Expr::var_decl(out_var, row_type.clone());
    let in_ref = rhs.row_ref();
    let mut body = rhs.into_fragments();
    body.push(RuleRhs::Condition(Expr::set(out_decl, in_ref)));

    let head = Atom::new(sym(create.name.clone()), Expr::var(out_var, row_type));
    ctx.add_rule(Rule::new(head, body));
    Ok(())
}
