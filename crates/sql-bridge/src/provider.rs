//! DML dispatcher
//!
//! Accepts a batch of client statements, parses each with the second
//! dialect, and drives the engine inside a single transaction: updates are
//! pushed per statement, the commit streams changes through the ingest
//! callback into the materialized views, and any failure rolls the whole
//! batch back. Exactly one of commit or rollback runs on every exit path.

use crate::codec;
use crate::{
    BridgeError, ColumnMeta, MaterializedViews, ResultSet, Row, SqlRequest, SqlResponse, SqlValue,
};
use ddlog_engine::{DeltaEngine, Record, Update, UpdateKind};
use ddlog_ir::{relation_name, relation_to_table, type_name};
use dml_parser::{
    BinaryOp, DeleteStatement, Expr, InsertStatement, SelectItem, SelectStatement, Statement,
};
use sql_catalog::{Catalog, FieldMeta, TableMeta};
use tracing::{debug, error, warn};

/// The SQL facade over an engine handle.
///
/// Holds the catalog built from the initialization DDL and the
/// materialized views fed by commit change streams. The engine handle is
/// owned by the caller and borrowed per batch.
pub struct DdlogProvider {
    catalog: Catalog,
    views: MaterializedViews,
}

impl DdlogProvider {
    /// Build the provider from the same ordered DDL list the translator
    /// compiled
    pub fn new<S: AsRef<str>>(ddl: &[S]) -> Result<Self, BridgeError> {
        Ok(DdlogProvider {
            catalog: Catalog::from_ddl(ddl)?,
            views: MaterializedViews::new(),
        })
    }

    /// The metadata catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute a request batch as one transaction.
    ///
    /// On success every statement's response is returned in order. On any
    /// failure the transaction is rolled back, the batch's results are
    /// discarded, and the error is returned; a rollback that itself fails
    /// is fatal and reported as [`BridgeError::RollbackFailed`].
    pub fn execute_batch<E: DeltaEngine>(
        &self,
        engine: &E,
        requests: &[SqlRequest],
    ) -> Result<Vec<SqlResponse>, BridgeError> {
        engine.transaction_start()?;
        debug!(statements = requests.len(), "transaction started");

        match self.run_batch(engine, requests) {
            Ok(responses) => {
                let mut ingest_error: Option<BridgeError> = None;
                let commit = engine.transaction_commit_dump_changes(&mut |change| {
                    if ingest_error.is_none() {
                        if let Err(e) = self.apply_change(engine, change) {
                            ingest_error = Some(e);
                        }
                    }
                });
                if let Err(e) = commit {
                    warn!(error = %e, "commit failed, rolling back");
                    self.rollback(engine)?;
                    return Err(BridgeError::Engine(e));
                }
                if let Some(e) = ingest_error {
                    // The commit already happened; surface the violation
                    return Err(e);
                }
                debug!("transaction committed");
                Ok(responses)
            }
            Err(e) => {
                warn!(error = %e, "batch failed, rolling back");
                self.rollback(engine)?;
                Err(e)
            }
        }
    }

    fn rollback<E: DeltaEngine>(&self, engine: &E) -> Result<(), BridgeError> {
        engine.transaction_rollback().map_err(|rollback_error| {
            error!(error = %rollback_error, "rollback failed");
            BridgeError::RollbackFailed(rollback_error)
        })
    }

    fn run_batch<E: DeltaEngine>(
        &self,
        engine: &E,
        requests: &[SqlRequest],
    ) -> Result<Vec<SqlResponse>, BridgeError> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(self.execute_statement(engine, request)?);
        }
        Ok(responses)
    }

    fn execute_statement<E: DeltaEngine>(
        &self,
        engine: &E,
        request: &SqlRequest,
    ) -> Result<SqlResponse, BridgeError> {
        debug!(sql = %request.sql, "executing statement");
        let statement = dml_parser::parse(&request.sql).map_err(|errs| BridgeError::Parse {
            statement: request.sql.clone(),
            message: errs
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "unknown parse error".to_string()),
        })?;

        let mut bindings = BindingCursor::new(&request.bindings);
        match statement {
            Statement::Select(select) => self.execute_select(&select),
            Statement::Insert(insert) => self.execute_insert(engine, &insert, &mut bindings),
            Statement::Delete(delete) => self.execute_delete(engine, &delete, &mut bindings),
        }
    }

    fn lookup_table(&self, name: &str) -> Result<&TableMeta, BridgeError> {
        self.catalog
            .get(name)
            .ok_or_else(|| BridgeError::UnknownTable(name.to_uppercase()))
    }

    fn execute_select(&self, select: &SelectStatement) -> Result<SqlResponse, BridgeError> {
        if select.items.len() != 1 || select.items[0] != SelectItem::Star {
            return Err(BridgeError::Unsupported(format!(
                "only `SELECT * FROM {}` is served",
                select.table
            )));
        }
        let table = self.lookup_table(&select.table)?;
        let columns = table
            .fields
            .iter()
            .map(|f| ColumnMeta {
                name: f.name.clone(),
                sql_type: f.sql_type.clone(),
            })
            .collect();
        let rows = self.views.snapshot(&table.name);
        Ok(SqlResponse::rows(ResultSet { columns, rows }))
    }

    fn execute_insert<E: DeltaEngine>(
        &self,
        engine: &E,
        insert: &InsertStatement,
        bindings: &mut BindingCursor<'_>,
    ) -> Result<SqlResponse, BridgeError> {
        let table = self.lookup_table(&insert.table)?;
        let relid = engine.get_table_id(&relation_name(&insert.table))?;
        let tag = type_name(&insert.table);

        for row in &insert.rows {
            if row.len() != table.fields.len() {
                return Err(BridgeError::Arity {
                    table: table.name.clone(),
                    expected: table.fields.len(),
                    found: row.len(),
                });
            }
            let mut fields = Vec::with_capacity(row.len());
            for (expr, field) in row.iter().zip(&table.fields) {
                let value = argument_value(expr, field, bindings)?;
                fields.push(codec::encode_value(field, &value)?);
            }
            let record = Record::make_struct(tag.clone(), fields);
            engine.apply_updates(&[Update::new(UpdateKind::Insert, relid, record)])?;
        }
        Ok(SqlResponse::update(insert.rows.len()))
    }

    fn execute_delete<E: DeltaEngine>(
        &self,
        engine: &E,
        delete: &DeleteStatement,
        bindings: &mut BindingCursor<'_>,
    ) -> Result<SqlResponse, BridgeError> {
        let table = self.lookup_table(&delete.table)?;
        let predicate = delete.where_clause.as_ref().ok_or_else(|| {
            BridgeError::Unsupported(format!(
                "DELETE from {} without a WHERE clause",
                delete.table
            ))
        })?;
        if table.primary_key.is_empty() {
            return Err(BridgeError::NoPrimaryKey {
                table: table.name.clone(),
            });
        }

        // The match-expressions correspond to the primary-key columns, in
        // pk declaration order regardless of the order in the WHERE clause.
        let mut matches: Vec<Option<Record>> = vec![None; table.primary_key.len()];
        collect_pk_matches(table, predicate, bindings, &mut matches)?;

        let mut key_parts = Vec::with_capacity(matches.len());
        for (i, matched) in matches.into_iter().enumerate() {
            key_parts.push(matched.ok_or_else(|| BridgeError::PkNotCovered {
                table: table.name.clone(),
                column: table.primary_key[i].clone(),
            })?);
        }
        let record = if key_parts.len() == 1 {
            key_parts.remove(0)
        } else {
            Record::make_tuple(key_parts)
        };

        let relid = engine.get_table_id(&relation_name(&delete.table))?;
        engine.apply_updates(&[Update::new(UpdateKind::DeleteKey, relid, record)])?;
        Ok(SqlResponse::update(1))
    }

    /// Ingest one post-commit change into the materialized views
    fn apply_change<E: DeltaEngine>(
        &self,
        engine: &E,
        change: &Update,
    ) -> Result<(), BridgeError> {
        let relation = engine.get_table_name(change.relid)?;
        if relation.len() < 2 {
            return Err(BridgeError::Invariant(format!(
                "relation name {:?} does not follow the compiler naming convention",
                relation
            )));
        }
        let table_name = relation_to_table(&relation);
        let table = self
            .catalog
            .get(&table_name)
            .ok_or_else(|| BridgeError::UnknownTable(table_name))?;

        let mut row: Row = Vec::with_capacity(table.fields.len());
        for (i, field) in table.fields.iter().enumerate() {
            let record = change
                .record
                .struct_field(i)
                .ok_or_else(|| BridgeError::MalformedChange(relation.clone()))?;
            row.push(codec::decode_value(field, record)?);
        }

        match change.kind {
            UpdateKind::Insert => self.views.insert(&table.name, row),
            UpdateKind::DeleteVal => self.views.remove(&table.name, &row),
            UpdateKind::DeleteKey => {
                return Err(BridgeError::UnexpectedChange { relation });
            }
        }
        Ok(())
    }
}

/// Positional binding cursor for one statement
struct BindingCursor<'a> {
    values: &'a [SqlValue],
    index: usize,
}

impl<'a> BindingCursor<'a> {
    fn new(values: &'a [SqlValue]) -> Self {
        BindingCursor { values, index: 0 }
    }

    fn next(&mut self) -> Result<&'a SqlValue, BridgeError> {
        let value = self.values.get(self.index).ok_or(BridgeError::MissingBinding)?;
        self.index += 1;
        Ok(value)
    }
}

/// Resolve a row element or comparison operand: a placeholder consumes the
/// next positional binding, a literal is parsed directly.
fn argument_value(
    expr: &Expr,
    field: &FieldMeta,
    bindings: &mut BindingCursor<'_>,
) -> Result<SqlValue, BridgeError> {
    match expr {
        Expr::Placeholder => Ok(bindings.next()?.clone()),
        Expr::Integer(_)
        | Expr::String(_)
        | Expr::Boolean(_)
        | Expr::Null => Ok(codec::literal_value(field, expr)?),
        other => Err(BridgeError::Unsupported(format!(
            "expression {:?} is not a literal or placeholder",
            other
        ))),
    }
}

/// Walk a DELETE predicate: a conjunction of `column = value` equalities,
/// writing each encoded value at its pk ordinal. Constraining the same pk
/// column twice is an error.
fn collect_pk_matches(
    table: &TableMeta,
    expr: &Expr,
    bindings: &mut BindingCursor<'_>,
    matches: &mut [Option<Record>],
) -> Result<(), BridgeError> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOp::And,
            right,
        } => {
            collect_pk_matches(table, left, bindings, matches)?;
            collect_pk_matches(table, right, bindings, matches)
        }
        Expr::BinaryOp {
            left,
            op: BinaryOp::Eq,
            right,
        } => {
            // Either side of `=` may be the column identifier
            let (column, value_expr) = match (left.as_ref(), right.as_ref()) {
                (Expr::Column(c), value) => (c, value),
                (value, Expr::Column(c)) => (c, value),
                _ => {
                    return Err(BridgeError::Unsupported(format!(
                        "equality without a column operand: {:?}",
                        expr
                    )))
                }
            };
            let ordinal = table
                .primary_key
                .iter()
                .position(|pk| pk.eq_ignore_ascii_case(column))
                .ok_or_else(|| BridgeError::NotPrimaryKey {
                    table: table.name.clone(),
                    column: column.clone(),
                })?;
            if matches[ordinal].is_some() {
                return Err(BridgeError::DuplicatePkPredicate {
                    table: table.name.clone(),
                    column: table.primary_key[ordinal].clone(),
                });
            }
            let field = table
                .field(&table.primary_key[ordinal])
                .map(|(_, f)| f)
                .ok_or_else(|| {
                    BridgeError::Invariant(format!(
                        "primary key column {} missing from field list of {}",
                        column, table.name
                    ))
                })?;
            let value = argument_value(value_expr, field, bindings)?;
            matches[ordinal] = Some(codec::encode_value(field, &value)?);
            Ok(())
        }
        other => Err(BridgeError::Unsupported(format!(
            "operator in DELETE WHERE clause: {:?}",
            other
        ))),
    }
}
