//! Value codec
//!
//! Bidirectional conversion between client-side values / SQL literals and
//! engine records, per catalog column type. Nullable columns use the
//! engine's option convention: at send time every value is wrapped in a
//! single-field struct tagged `ddlog_std::Some` (null becomes
//! `ddlog_std::None`); at receive time the wrapper is recognized by its
//! fully-qualified tag and unwrapped.
//!
//! Integer widths are explicit: SQL `integer` is 32-bit client-side but
//! signed-64 in the engine, SQL `bigint` is 64-bit client-side but
//! arbitrary-precision in the engine. Decoding narrows and rejects
//! out-of-range values rather than truncating.

use crate::SqlValue;
use ddlog_engine::Record;
use num_bigint::BigInt;
use sql_catalog::{FieldMeta, SqlType};

/// Fully-qualified tag of the nullable wrapper's present case
pub const DDLOG_SOME: &str = "ddlog_std::Some";
/// Fully-qualified tag of the nullable wrapper's absent case
pub const DDLOG_NONE: &str = "ddlog_std::None";

/// Errors raised while converting values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("cannot encode {value:?} into {column} ({sql_type:?})")]
    Encode {
        column: String,
        sql_type: SqlType,
        value: SqlValue,
    },
    #[error("cannot decode {record:?} from {column} ({sql_type:?})")]
    Decode {
        column: String,
        sql_type: SqlType,
        record: Record,
    },
    #[error("value {value} of column {column} is out of range for a 32-bit integer")]
    IntegerRange { column: String, value: i64 },
    #[error("value of column {column} is out of range for a 64-bit integer")]
    BigintRange { column: String },
    #[error("null value for non-nullable column {0}")]
    NullNotAllowed(String),
    #[error("literal {literal} cannot be constructed for {column} ({sql_type:?})")]
    Literal {
        column: String,
        sql_type: SqlType,
        literal: String,
    },
}

/// Encode a client value for a column, applying the nullable wrapper rule
pub fn encode_value(field: &FieldMeta, value: &SqlValue) -> Result<Record, CodecError> {
    if let SqlValue::Null = value {
        if !field.nullable {
            return Err(CodecError::NullNotAllowed(field.name.clone()));
        }
        return Ok(Record::make_struct(DDLOG_NONE, vec![]));
    }

    let plain = match (&field.sql_type, value) {
        (SqlType::Boolean, SqlValue::Bool(b)) => Record::Bool(*b),
        (SqlType::Integer, SqlValue::Int(i)) => Record::Signed(i64::from(*i)),
        (SqlType::Bigint, SqlValue::BigInt(i)) => Record::Big(BigInt::from(*i)),
        (SqlType::Varchar(_), SqlValue::Text(s)) => Record::Str(s.clone()),
        _ => {
            return Err(CodecError::Encode {
                column: field.name.clone(),
                sql_type: field.sql_type.clone(),
                value: value.clone(),
            })
        }
    };
    Ok(maybe_option(field.nullable, plain))
}

/// Wrap a record for a nullable column
fn maybe_option(nullable: bool, record: Record) -> Record {
    if nullable {
        Record::make_struct(DDLOG_SOME, vec![record])
    } else {
        record
    }
}

/// Convert a parsed SQL literal to the client value of a column. Decimal
/// literals narrow or widen to the column's width; narrowing rejects
/// out-of-range literals.
pub fn literal_value(field: &FieldMeta, literal: &dml_parser::Expr) -> Result<SqlValue, CodecError> {
    let fail = |literal: &dml_parser::Expr| CodecError::Literal {
        column: field.name.clone(),
        sql_type: field.sql_type.clone(),
        literal: format!("{:?}", literal),
    };
    match (&field.sql_type, literal) {
        (_, dml_parser::Expr::Null) => Ok(SqlValue::Null),
        (SqlType::Boolean, dml_parser::Expr::Boolean(b)) => Ok(SqlValue::Bool(*b)),
        (SqlType::Integer, dml_parser::Expr::Integer(n)) => i32::try_from(*n)
            .map(SqlValue::Int)
            .map_err(|_| fail(literal)),
        (SqlType::Bigint, dml_parser::Expr::Integer(n)) => Ok(SqlValue::BigInt(*n)),
        (SqlType::Varchar(_), dml_parser::Expr::String(s)) => Ok(SqlValue::Text(s.clone())),
        _ => Err(fail(literal)),
    }
}

/// Decode an engine record for a column back to a client value. A
/// top-level `None` struct yields null, a `Some` struct yields its inner
/// value decoded the same way, and any other record decodes as the plain
/// value.
pub fn decode_value(field: &FieldMeta, record: &Record) -> Result<SqlValue, CodecError> {
    if let Record::Struct { name, fields } = record {
        if name == DDLOG_NONE {
            return Ok(SqlValue::Null);
        }
        if name == DDLOG_SOME {
            let inner = fields.first().ok_or_else(|| CodecError::Decode {
                column: field.name.clone(),
                sql_type: field.sql_type.clone(),
                record: record.clone(),
            })?;
            return decode_plain(field, inner);
        }
    }
    decode_plain(field, record)
}

fn decode_plain(field: &FieldMeta, record: &Record) -> Result<SqlValue, CodecError> {
    match (&field.sql_type, record) {
        (SqlType::Boolean, Record::Bool(b)) => Ok(SqlValue::Bool(*b)),
        (SqlType::Integer, Record::Signed(v)) => {
            i32::try_from(*v)
                .map(SqlValue::Int)
                .map_err(|_| CodecError::IntegerRange {
                    column: field.name.clone(),
                    value: *v,
                })
        }
        (SqlType::Bigint, Record::Big(b)) => {
            i64::try_from(b)
                .map(SqlValue::BigInt)
                .map_err(|_| CodecError::BigintRange {
                    column: field.name.clone(),
                })
        }
        (SqlType::Varchar(_), Record::Str(s)) => Ok(SqlValue::Text(s.clone())),
        _ => Err(CodecError::Decode {
            column: field.name.clone(),
            sql_type: field.sql_type.clone(),
            record: record.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, sql_type: SqlType, nullable: bool) -> FieldMeta {
        FieldMeta {
            name: name.to_string(),
            sql_type,
            nullable,
        }
    }

    #[test]
    fn test_plain_round_trip() {
        let cases = vec![
            (field("b", SqlType::Boolean, false), SqlValue::Bool(true)),
            (field("i", SqlType::Integer, false), SqlValue::Int(-7)),
            (field("l", SqlType::Bigint, false), SqlValue::BigInt(1 << 40)),
            (
                field("s", SqlType::Varchar(Some(8)), false),
                SqlValue::Text("abc".to_string()),
            ),
        ];
        for (f, value) in cases {
            let record = encode_value(&f, &value).unwrap();
            assert_eq!(decode_value(&f, &record).unwrap(), value);
        }
    }

    #[test]
    fn test_nullable_wrapper_round_trip() {
        let f = field("name", SqlType::Varchar(None), true);

        let some = encode_value(&f, &SqlValue::Text("a".to_string())).unwrap();
        assert_eq!(
            some,
            Record::make_struct(DDLOG_SOME, vec![Record::Str("a".to_string())])
        );
        assert_eq!(
            decode_value(&f, &some).unwrap(),
            SqlValue::Text("a".to_string())
        );

        let none = encode_value(&f, &SqlValue::Null).unwrap();
        assert_eq!(none, Record::make_struct(DDLOG_NONE, vec![]));
        assert_eq!(decode_value(&f, &none).unwrap(), SqlValue::Null);
    }

    #[test]
    fn test_null_rejected_for_non_nullable_column() {
        let f = field("id", SqlType::Integer, false);
        assert_eq!(
            encode_value(&f, &SqlValue::Null),
            Err(CodecError::NullNotAllowed("id".to_string()))
        );
    }

    #[test]
    fn test_integer_decode_narrows_and_rejects_overflow() {
        let f = field("id", SqlType::Integer, false);
        let wide = Record::Signed(i64::from(i32::MAX) + 1);
        assert_eq!(
            decode_value(&f, &wide),
            Err(CodecError::IntegerRange {
                column: "id".to_string(),
                value: i64::from(i32::MAX) + 1,
            })
        );
        assert_eq!(
            decode_value(&f, &Record::Signed(42)).unwrap(),
            SqlValue::Int(42)
        );
    }

    #[test]
    fn test_literal_narrowing_per_column_type() {
        let int_col = field("i", SqlType::Integer, false);
        let big_col = field("l", SqlType::Bigint, false);

        assert_eq!(
            literal_value(&int_col, &dml_parser::Expr::Integer(7)).unwrap(),
            SqlValue::Int(7)
        );
        assert_eq!(
            literal_value(&big_col, &dml_parser::Expr::Integer(1 << 40)).unwrap(),
            SqlValue::BigInt(1 << 40)
        );
        // Out-of-range narrowing is a literal-construction failure
        assert!(literal_value(&int_col, &dml_parser::Expr::Integer(1 << 40)).is_err());
        // A quoted literal in an integer column fails too
        assert!(
            literal_value(&int_col, &dml_parser::Expr::String("x".to_string())).is_err()
        );
    }

    #[test]
    fn test_type_mismatch_is_an_error_both_ways() {
        let f = field("id", SqlType::Integer, false);
        assert!(matches!(
            encode_value(&f, &SqlValue::Text("x".to_string())),
            Err(CodecError::Encode { .. })
        ));
        assert!(matches!(
            decode_value(&f, &Record::Str("x".to_string())),
            Err(CodecError::Decode { .. })
        ));
    }
}
