//! DDL dialect parser implementation using Chumsky 0.9

use chumsky::prelude::*;
use sql_lexer::{Keyword, Span, Token};

use crate::ast::*;

/// Parse result type
pub type ParseResult = Result<Statement, Vec<ParseError>>;

/// A parse error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// Parse a DDL string into a Statement
pub fn parse(input: &str) -> ParseResult {
    // First, lex the input
    let tokens = sql_lexer::lexer(input).map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                message: e.message,
                span: e.span,
            })
            .collect::<Vec<_>>()
    })?;

    // Then parse the tokens
    parse_tokens(tokens)
}

/// Parse a token stream into a Statement
fn parse_tokens(tokens: Vec<(Token, Span)>) -> ParseResult {
    let len = tokens.last().map(|(_, s)| s.end).unwrap_or(0);

    // Convert to range-based stream
    let token_stream: Vec<(Token, std::ops::Range<usize>)> = tokens
        .into_iter()
        .map(|(t, s)| (t, s.start..s.end))
        .collect();

    let stream = chumsky::Stream::from_iter(len..len + 1, token_stream.into_iter());

    statement_parser().parse(stream).map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                message: format!("Unexpected token: {:?}", e.found()),
                span: Span::new(e.span().start, e.span().end),
            })
            .collect()
    })
}

/// Build the statement parser
fn statement_parser() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    create_table_parser()
        .map(Statement::CreateTable)
        .or(create_view_parser().map(Statement::CreateView))
        .then_ignore(just(Token::Semicolon).or_not())
        .then_ignore(end())
}

/// Parse an identifier token
fn identifier() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! {
        Token::Identifier(name) => name,
    }
}

/// Parse CREATE TABLE name (columns and constraints)
fn create_table_parser() -> impl Parser<Token, CreateTableStatement, Error = Simple<Token>> {
    let create_kw = just(Token::Keyword(Keyword::Create));
    let table_kw = just(Token::Keyword(Keyword::Table));

    // Column definitions and table constraints can be mixed
    let column_or_constraint = column_def_parser()
        .map(Either::Left)
        .or(table_constraint_parser().map(Either::Right));

    let definitions = column_or_constraint
        .separated_by(just(Token::Comma))
        .at_least(1)
        .delimited_by(just(Token::LParen), just(Token::RParen));

    create_kw
        .ignore_then(table_kw)
        .ignore_then(identifier())
        .then(definitions)
        .map(|(name, defs)| {
            let mut columns = Vec::new();
            let mut constraints = Vec::new();
            for def in defs {
                match def {
                    Either::Left(col) => columns.push(col),
                    Either::Right(constraint) => constraints.push(constraint),
                }
            }
            CreateTableStatement {
                name,
                columns,
                constraints,
            }
        })
}

/// Helper enum for parsing mixed column defs and table constraints
enum Either<L, R> {
    Left(L),
    Right(R),
}

/// Parse a data type (boolean, integer, bigint, varchar[(k)])
fn data_type_parser() -> impl Parser<Token, SqlType, Error = Simple<Token>> + Clone {
    let varchar = just(Token::Keyword(Keyword::Varchar))
        .ignore_then(
            select! { Token::Integer(n) => n }
                .delimited_by(just(Token::LParen), just(Token::RParen))
                .or_not(),
        )
        .map(|len| SqlType::Varchar(len.map(|n| n as u32)));

    select! {
        Token::Keyword(Keyword::Boolean) => SqlType::Boolean,
        Token::Keyword(Keyword::Integer) => SqlType::Integer,
        Token::Keyword(Keyword::Bigint) => SqlType::Bigint,
    }
    .or(varchar)
}

/// Column constraints during parsing
enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
}

/// Parse a column definition
fn column_def_parser() -> impl Parser<Token, ColumnDef, Error = Simple<Token>> + Clone {
    let not_null = just(Token::Keyword(Keyword::Not))
        .then(just(Token::Keyword(Keyword::Null)))
        .to(());

    let null = just(Token::Keyword(Keyword::Null)).to(());

    let primary_key = just(Token::Keyword(Keyword::Primary))
        .then(just(Token::Keyword(Keyword::Key)))
        .to(());

    // Constraints can appear in any order after the data type
    let constraint = not_null
        .map(|_| ColumnConstraint::NotNull)
        .or(null.map(|_| ColumnConstraint::Null))
        .or(primary_key.map(|_| ColumnConstraint::PrimaryKey));

    identifier()
        .then(data_type_parser())
        .then(constraint.repeated())
        .map(|((name, data_type), constraints)| {
            let mut nullable = true;
            let mut primary_key = false;

            for c in constraints {
                match c {
                    ColumnConstraint::NotNull => nullable = false,
                    ColumnConstraint::Null => nullable = true,
                    ColumnConstraint::PrimaryKey => {
                        primary_key = true;
                        nullable = false; // Primary keys are implicitly NOT NULL
                    }
                }
            }

            ColumnDef {
                name,
                data_type,
                nullable,
                primary_key,
            }
        })
}

/// Parse a PRIMARY KEY (c1, c2, …) table constraint
fn table_constraint_parser() -> impl Parser<Token, TableConstraint, Error = Simple<Token>> + Clone {
    just(Token::Keyword(Keyword::Primary))
        .ignore_then(just(Token::Keyword(Keyword::Key)))
        .ignore_then(
            identifier()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        )
        .map(|columns| TableConstraint::PrimaryKey { columns })
}

/// Parse CREATE VIEW name AS query
fn create_view_parser() -> impl Parser<Token, CreateViewStatement, Error = Simple<Token>> {
    just(Token::Keyword(Keyword::Create))
        .ignore_then(just(Token::Keyword(Keyword::View)))
        .ignore_then(identifier())
        .then_ignore(just(Token::Keyword(Keyword::As)))
        .then(select_parser())
        .map(|(name, query)| CreateViewStatement { name, query })
}

/// Parse a SELECT query body, recursively to allow subqueries in FROM
fn select_parser() -> impl Parser<Token, SelectStatement, Error = Simple<Token>> + Clone {
    recursive(|select| {
        let with_clause = just(Token::Keyword(Keyword::With))
            .ignore_then(identifier())
            .then_ignore(just(Token::Keyword(Keyword::As)))
            .then(
                select
                    .clone()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map(|(name, query)| WithCte {
                name,
                query: Box::new(query),
            })
            .or_not();

        let distinct = just(Token::Keyword(Keyword::Distinct))
            .or_not()
            .map(|d| d.is_some());

        let items = select_item_parser()
            .separated_by(just(Token::Comma))
            .at_least(1);

        let from_source = select
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|q| FromClause::Subquery(Box::new(q)))
            .or(identifier().map(FromClause::Table));

        let from_clause = just(Token::Keyword(Keyword::From))
            .ignore_then(from_source)
            .or_not();

        let where_clause = just(Token::Keyword(Keyword::Where))
            .ignore_then(expr_parser())
            .or_not();

        let order_by_clause = just(Token::Keyword(Keyword::Order))
            .ignore_then(just(Token::Keyword(Keyword::By)))
            .ignore_then(expr_parser().separated_by(just(Token::Comma)).at_least(1))
            .or_not()
            .map(|o| o.unwrap_or_default());

        let limit_clause = just(Token::Keyword(Keyword::Limit))
            .ignore_then(select! { Token::Integer(n) => n })
            .or_not();

        with_clause
            .then_ignore(just(Token::Keyword(Keyword::Select)))
            .then(distinct)
            .then(items)
            .then(from_clause)
            .then(where_clause)
            .then(order_by_clause)
            .then(limit_clause)
            .map(
                |((((((with, distinct), items), from), where_clause), order_by), limit)| {
                    SelectStatement {
                        with,
                        distinct,
                        items,
                        from,
                        where_clause,
                        order_by,
                        limit,
                    }
                },
            )
    })
}

/// Parse a SELECT item (either * or expression with optional alias)
fn select_item_parser() -> impl Parser<Token, SelectItem, Error = Simple<Token>> + Clone {
    just(Token::Star).to(SelectItem::Star).or(expr_parser()
        .then(
            just(Token::Keyword(Keyword::As))
                .ignore_then(identifier())
                .or_not(),
        )
        .map(|(expr, alias)| SelectItem::Expr { expr, alias }))
}

/// Parse an expression with proper precedence
fn expr_parser() -> impl Parser<Token, Expr, Error = Simple<Token>> + Clone {
    recursive(|expr| {
        let literal = select! {
            Token::Integer(n) => Expr::Integer(n),
            Token::String(s) => Expr::String(s),
            Token::Keyword(Keyword::True) => Expr::Boolean(true),
            Token::Keyword(Keyword::False) => Expr::Boolean(false),
            Token::Keyword(Keyword::Null) => Expr::Null,
        };

        // Negative numbers are lexed as minus followed by integer
        let negative = just(Token::Minus)
            .ignore_then(select! { Token::Integer(n) => n })
            .map(|n| Expr::Integer(-n));

        // Support both simple columns (name) and qualified columns (table.name)
        let column = identifier()
            .then(just(Token::Dot).ignore_then(identifier()).or_not())
            .map(|(first, second)| match second {
                Some(name) => Expr::Column {
                    qualifier: Some(first),
                    name,
                },
                None => Expr::Column {
                    qualifier: None,
                    name: first,
                },
            });

        let paren_expr = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = literal.or(negative).or(column).or(paren_expr);

        let not = just(Token::Keyword(Keyword::Not))
            .repeated()
            .then(atom)
            .foldr(|_, e| Expr::Not(Box::new(e)));

        let comparison = not
            .clone()
            .then(
                just(Token::Eq)
                    .to(BinaryOp::Eq)
                    .or(just(Token::NotEq).to(BinaryOp::NotEq))
                    .or(just(Token::LtEq).to(BinaryOp::LtEq))
                    .or(just(Token::GtEq).to(BinaryOp::GtEq))
                    .or(just(Token::Lt).to(BinaryOp::Lt))
                    .or(just(Token::Gt).to(BinaryOp::Gt))
                    .then(not)
                    .repeated(),
            )
            .foldl(|left, (op, right)| Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });

        let and_expr = comparison
            .clone()
            .then(
                just(Token::Keyword(Keyword::And))
                    .to(BinaryOp::And)
                    .then(comparison)
                    .repeated(),
            )
            .foldl(|left, (op, right)| Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });

        and_expr
            .clone()
            .then(
                just(Token::Keyword(Keyword::Or))
                    .to(BinaryOp::Or)
                    .then(and_expr)
                    .repeated(),
            )
            .foldl(|left, (op, right)| Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            })
    })
}
