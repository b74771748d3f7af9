//! Engine record values
//!
//! The flat value representation the engine exchanges over its command
//! interface: scalars, tagged structs, and tuples. Struct field order is
//! the declaration order of the corresponding row type.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A value in an engine command or change record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Record {
    /// Boolean
    Bool(bool),
    /// Signed integer
    Signed(i64),
    /// Arbitrary-precision integer
    Big(BigInt),
    /// UTF-8 string
    Str(String),
    /// Tagged struct with ordered fields
    Struct { name: String, fields: Vec<Record> },
    /// Tuple with ordered elements
    Tuple(Vec<Record>),
}

impl Record {
    /// Build a tagged struct record
    pub fn make_struct(name: impl Into<String>, fields: Vec<Record>) -> Self {
        Record::Struct {
            name: name.into(),
            fields,
        }
    }

    /// Build a tuple record
    pub fn make_tuple(elements: Vec<Record>) -> Self {
        Record::Tuple(elements)
    }

    /// Whether this record is a tagged struct
    pub fn is_struct(&self) -> bool {
        matches!(self, Record::Struct { .. })
    }

    /// The struct tag, if this is a tagged struct
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Record::Struct { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The i-th struct field, if this is a tagged struct
    pub fn struct_field(&self, index: usize) -> Option<&Record> {
        match self {
            Record::Struct { fields, .. } => fields.get(index),
            _ => None,
        }
    }
}
