//! Metadata catalog
//!
//! The second pass over the initialization DDL. While the translator compiles
//! the statements into the relational IR, the catalog records the metadata
//! the DML runtime is driven by: field orderings, nullabilities, and primary
//! keys per table, with view column lists derived from their defining
//! queries. Table names are canonicalized to upper-case; lookups are
//! case-insensitive. The catalog is populated once and immutable thereafter.

use indexmap::IndexMap;
use sql_parser::{
    CreateTableStatement, CreateViewStatement, Expr, FromClause, SelectItem, SelectStatement,
    Statement, TableConstraint,
};

pub use sql_parser::SqlType;

/// Errors raised while building the catalog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse DDL statement {statement:?}: {message}")]
    Parse { statement: String, message: String },
    #[error("table {0} is declared twice")]
    DuplicateTable(String),
    #[error("unknown table {0}")]
    UnknownTable(String),
    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },
    #[error("primary key column {0} is not a declared column")]
    UnknownPkColumn(String),
    #[error("view {view}: cannot derive a column list from {construct}")]
    Underivable { view: String, construct: String },
}

/// A column's metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    /// Column name as declared
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
}

/// A table's (or view's) metadata
#[derive(Debug, Clone, PartialEq)]
pub struct TableMeta {
    /// Canonical (upper-case) table name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldMeta>,
    /// Primary-key field names, in pk declaration order; empty for views
    pub primary_key: Vec<String>,
}

impl TableMeta {
    /// Find a field and its ordinal by case-insensitive name
    pub fn field(&self, name: &str) -> Option<(usize, &FieldMeta)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.name.eq_ignore_ascii_case(name))
    }
}

/// The catalog: an ordered mapping from canonical table name to metadata
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: IndexMap<String, TableMeta>,
}

impl Catalog {
    /// Build the catalog from the ordered initialization DDL list
    pub fn from_ddl<S: AsRef<str>>(statements: &[S]) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        for sql in statements {
            let sql = sql.as_ref();
            let statement = sql_parser::parse(sql).map_err(|errs| CatalogError::Parse {
                statement: sql.to_string(),
                message: errs
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "unknown parse error".to_string()),
            })?;
            match statement {
                Statement::CreateTable(create) => catalog.add_table(create)?,
                Statement::CreateView(create) => catalog.add_view(create)?,
            }
        }
        Ok(catalog)
    }

    /// Look up a table by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(&name.to_uppercase())
    }

    /// All tables and views, in declaration order
    pub fn tables(&self) -> impl Iterator<Item = &TableMeta> {
        self.tables.values()
    }

    fn add_table(&mut self, create: CreateTableStatement) -> Result<(), CatalogError> {
        let name = create.name.to_uppercase();
        if self.tables.contains_key(&name) {
            return Err(CatalogError::DuplicateTable(name));
        }

        let mut fields: Vec<FieldMeta> = create
            .columns
            .iter()
            .map(|c| FieldMeta {
                name: c.name.clone(),
                sql_type: c.data_type.clone(),
                nullable: c.nullable,
            })
            .collect();

        // A table-level PRIMARY KEY constraint wins over column flags; its
        // column order is the pk declaration order.
        let mut primary_key: Vec<String> = Vec::new();
        let constraint_pk = create.constraints.iter().find_map(|c| match c {
            TableConstraint::PrimaryKey { columns } => Some(columns.clone()),
        });
        if let Some(columns) = constraint_pk {
            for pk_col in &columns {
                let field = fields
                    .iter_mut()
                    .find(|f| f.name.eq_ignore_ascii_case(pk_col))
                    .ok_or_else(|| CatalogError::UnknownPkColumn(pk_col.clone()))?;
                field.nullable = false;
                primary_key.push(field.name.clone());
            }
        } else {
            for column in &create.columns {
                if column.primary_key {
                    primary_key.push(column.name.clone());
                }
            }
        }

        self.tables.insert(
            name.clone(),
            TableMeta {
                name,
                fields,
                primary_key,
            },
        );
        Ok(())
    }

    fn add_view(&mut self, create: CreateViewStatement) -> Result<(), CatalogError> {
        let name = create.name.to_uppercase();
        if self.tables.contains_key(&name) {
            return Err(CatalogError::DuplicateTable(name));
        }

        // The synthetic column counter spans the whole view definition,
        // subqueries included, mirroring the translator's per-statement
        // local namespace.
        let mut synthetic = 0usize;
        let fields = self.view_fields(&create.name, &create.query, &mut synthetic)?;
        self.tables.insert(
            name.clone(),
            TableMeta {
                name,
                fields,
                primary_key: Vec::new(),
            },
        );
        Ok(())
    }

    /// Derive a view's column list from its defining query. Must stay
    /// consistent with the translator's projection naming: explicit alias,
    /// then the identifier's own name, then a synthetic `colᵏ`.
    fn view_fields(
        &self,
        view: &str,
        query: &SelectStatement,
        synthetic: &mut usize,
    ) -> Result<Vec<FieldMeta>, CatalogError> {
        let source = match &query.from {
            Some(FromClause::Table(table)) => self
                .get(table)
                .ok_or_else(|| CatalogError::UnknownTable(table.clone()))?
                .fields
                .clone(),
            Some(FromClause::Subquery(inner)) => self.view_fields(view, inner, synthetic)?,
            None => {
                return Err(CatalogError::Underivable {
                    view: view.to_string(),
                    construct: "a query without a FROM clause".to_string(),
                })
            }
        };

        if query.items.len() == 1 && query.items[0] == SelectItem::Star {
            return Ok(source);
        }

        let mut fields = Vec::new();
        for item in &query.items {
            match item {
                SelectItem::Star => {
                    return Err(CatalogError::Underivable {
                        view: view.to_string(),
                        construct: "`*` mixed with other select items".to_string(),
                    })
                }
                SelectItem::Expr { expr, alias } => {
                    let name = match (alias, expr.column_name()) {
                        (Some(alias), _) => alias.clone(),
                        (None, Some(column)) => column.to_lowercase(),
                        (None, None) => {
                            let name = format!("col{}", *synthetic);
                            *synthetic += 1;
                            name
                        }
                    };
                    let (sql_type, nullable) = self.expr_meta(view, expr, &source)?;
                    fields.push(FieldMeta {
                        name,
                        sql_type,
                        nullable,
                    });
                }
            }
        }
        Ok(fields)
    }

    /// SQL type and nullability of a projected expression
    fn expr_meta(
        &self,
        view: &str,
        expr: &Expr,
        source: &[FieldMeta],
    ) -> Result<(SqlType, bool), CatalogError> {
        match expr {
            Expr::Column { name, .. } => {
                let field = source
                    .iter()
                    .find(|f| f.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| CatalogError::UnknownColumn {
                        table: view.to_string(),
                        column: name.clone(),
                    })?;
                Ok((field.sql_type.clone(), field.nullable))
            }
            Expr::Integer(_) => Ok((SqlType::Integer, false)),
            Expr::String(_) => Ok((SqlType::Varchar(None), false)),
            Expr::Boolean(_) => Ok((SqlType::Boolean, false)),
            Expr::BinaryOp { .. } | Expr::Not(_) => Ok((SqlType::Boolean, false)),
            Expr::Null => Err(CatalogError::Underivable {
                view: view.to_string(),
                construct: "a bare NULL select item".to_string(),
            }),
        }
    }
}
