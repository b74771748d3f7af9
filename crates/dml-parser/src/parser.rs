//! Client statement dialect parser implementation using Chumsky 0.9

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

/// Parse a client statement string
pub fn parse(input: &str) -> ParseResult {
    let tokens = sql_lexer::lexer(input).map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                message: e.message,
                span: e.span,
            })
            .collect::<Vec<_>>()
    })?;

    parse_tokens(tokens)
}

/// Parse a token stream into a Statement
fn parse_tokens(tokens: Vec<(Token, Span)>) -> ParseResult {
    let len = tokens.last().map(|(_, s)| s.end).unwrap_or(0);

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
    select_parser()
        .map(Statement::Select)
        .or(insert_parser().map(Statement::Insert))
        .or(delete_parser().map(Statement::Delete))
        .then_ignore(just(Token::Semicolon).or_not())
        .then_ignore(end())
}

/// Parse an identifier token
fn identifier() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! {
        Token::Identifier(name) => name,
    }
}

/// Parse SELECT items FROM table
fn select_parser() -> impl Parser<Token, SelectStatement, Error = Simple<Token>> {
    let item = just(Token::Star)
        .to(SelectItem::Star)
        .or(identifier().map(SelectItem::Column));

    just(Token::Keyword(Keyword::Select))
        .ignore_then(item.separated_by(just(Token::Comma)).at_least(1))
        .then_ignore(just(Token::Keyword(Keyword::From)))
        .then(identifier())
        .map(|(items, table)| SelectStatement { items, table })
}

/// Parse INSERT INTO table VALUES (row), (row), …
fn insert_parser() -> impl Parser<Token, InsertStatement, Error = Simple<Token>> {
    let value_row = expr_parser()
        .separated_by(just(Token::Comma))
        .at_least(1)
        .delimited_by(just(Token::LParen), just(Token::RParen));

    just(Token::Keyword(Keyword::Insert))
        .ignore_then(just(Token::Keyword(Keyword::Into)))
        .ignore_then(identifier())
        .then_ignore(just(Token::Keyword(Keyword::Values)))
        .then(value_row.separated_by(just(Token::Comma)).at_least(1))
        .map(|(table, rows)| InsertStatement { table, rows })
}

/// Parse DELETE FROM table [WHERE predicate]
fn delete_parser() -> impl Parser<Token, DeleteStatement, Error = Simple<Token>> {
    just(Token::Keyword(Keyword::Delete))
        .ignore_then(just(Token::Keyword(Keyword::From)))
        .ignore_then(identifier())
        .then(
            just(Token::Keyword(Keyword::Where))
                .ignore_then(expr_parser())
                .or_not(),
        )
        .map(|(table, where_clause)| DeleteStatement {
            table,
            where_clause,
        })
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
            Token::Placeholder => Expr::Placeholder,
        };

        // Negative numbers are lexed as minus followed by integer
        let negative = just(Token::Minus)
            .ignore_then(select! { Token::Integer(n) => n })
            .map(|n| Expr::Integer(-n));

        let column = identifier().map(Expr::Column);

        let paren_expr = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = literal.or(negative).or(column).or(paren_expr);

        let comparison = atom
            .clone()
            .then(
                just(Token::Eq)
                    .to(BinaryOp::Eq)
                    .or(just(Token::NotEq).to(BinaryOp::NotEq))
                    .or(just(Token::LtEq).to(BinaryOp::LtEq))
                    .or(just(Token::GtEq).to(BinaryOp::GtEq))
                    .or(just(Token::Lt).to(BinaryOp::Lt))
                    .or(just(Token::Gt).to(BinaryOp::Gt))
                    .then(atom)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_star() {
        let stmt = parse("SELECT * FROM v_hosts").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                items: vec![SelectItem::Star],
                table: "v_hosts".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_insert_multi_row() {
        let stmt = parse("INSERT INTO hosts VALUES (1, 'a'), (2, 'b')").unwrap();
        match stmt {
            Statement::Insert(i) => {
                assert_eq!(i.table, "hosts");
                assert_eq!(
                    i.rows,
                    vec![
                        vec![Expr::Integer(1), Expr::String("a".to_string())],
                        vec![Expr::Integer(2), Expr::String("b".to_string())],
                    ]
                );
            }
            other => panic!("Expected Insert, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_insert_with_placeholders() {
        let stmt = parse("INSERT INTO hosts VALUES (?, ?)").unwrap();
        match stmt {
            Statement::Insert(i) => {
                assert_eq!(i.rows, vec![vec![Expr::Placeholder, Expr::Placeholder]]);
            }
            other => panic!("Expected Insert, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_by_composite_key() {
        let stmt = parse("DELETE FROM e WHERE a = 1 AND b = 2").unwrap();
        match stmt {
            Statement::Delete(d) => {
                assert_eq!(d.table, "e");
                match d.where_clause {
                    Some(Expr::BinaryOp { op, .. }) => assert_eq!(op, BinaryOp::And),
                    other => panic!("Expected conjunction, got {:?}", other),
                }
            }
            other => panic!("Expected Delete, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_without_where() {
        let stmt = parse("DELETE FROM hosts").unwrap();
        match stmt {
            Statement::Delete(d) => assert!(d.where_clause.is_none()),
            other => panic!("Expected Delete, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reversed_equality() {
        let stmt = parse("DELETE FROM hosts WHERE ? = id").unwrap();
        match stmt {
            Statement::Delete(d) => {
                assert_eq!(
                    d.where_clause,
                    Some(Expr::BinaryOp {
                        left: Box::new(Expr::Placeholder),
                        op: BinaryOp::Eq,
                        right: Box::new(Expr::Column("id".to_string())),
                    })
                );
            }
            other => panic!("Expected Delete, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_ddl() {
        assert!(parse("CREATE TABLE t (id integer)").is_err());
    }
}
