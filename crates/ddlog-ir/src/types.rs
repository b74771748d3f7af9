//! IR type system
//!
//! A closed variant of scalar and struct types. Struct field declaration
//! order is the canonical tuple order used by the engine codec, so fields
//! are kept as an ordered list.

use crate::Symbol;
use internment::Intern;
use std::fmt;

/// A type in the relational IR
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean
    Bool,
    /// Signed integer of the given bit width
    Signed { width: u32 },
    /// Arbitrary-precision integer
    BigInt,
    /// UTF-8 string
    String,
    /// Reference to a registered type-def by name
    User(Symbol),
    /// Struct with ordered fields
    Struct(Vec<Field>),
}

impl Type {
    /// 64-bit signed integer, the lowering of SQL `integer`
    pub fn signed64() -> Self {
        Type::Signed { width: 64 }
    }

    /// Reference a type-def by name
    pub fn user(name: impl Into<String>) -> Self {
        Type::User(Intern::new(name.into()))
    }

    /// The struct fields, if this is a struct type
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Type::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Signed { width } => write!(f, "signed<{}>", width),
            Type::BigInt => write!(f, "bigint"),
            Type::String => write!(f, "string"),
            Type::User(name) => write!(f, "{}", name),
            Type::Struct(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A named, typed struct field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Symbol,
    pub ty: Type,
}

impl Field {
    /// Create a new field
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Field {
            name: Intern::new(name.into()),
            ty,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// A type-def binds a unique type name to a struct type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: Symbol,
    pub ty: Type,
}

impl TypeDef {
    /// Create a new type-def
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        TypeDef {
            name: Intern::new(name.into()),
            ty,
        }
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Type::Struct(fields) => {
                write!(f, "typedef {} = {}", self.name, self.name)?;
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "}}")
            }
            other => write!(f, "typedef {} = {}", self.name, other),
        }
    }
}

/// The IR row type name for a SQL table: `T` + lower-cased table name.
/// Part of the wire contract with the engine.
pub fn type_name(table: &str) -> String {
    format!("T{}", table.to_lowercase())
}

/// The IR relation name for a SQL table: `R` + lower-cased table name.
/// Part of the wire contract with the engine.
pub fn relation_name(table: &str) -> String {
    format!("R{}", table.to_lowercase())
}

/// Reverse of the relation naming convention: strip the one-character
/// prefix and normalize to upper-case for the client-facing table name.
pub fn relation_to_table(relation: &str) -> String {
    relation[1..].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_convention() {
        assert_eq!(type_name("Hosts"), "Thosts");
        assert_eq!(relation_name("Hosts"), "Rhosts");
        assert_eq!(relation_to_table("Rhosts"), "HOSTS");
        assert_eq!(relation_to_table("Rv_hosts"), "V_HOSTS");
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::signed64().to_string(), "signed<64>");
        assert_eq!(Type::user("Thosts").to_string(), "Thosts");
        let s = Type::Struct(vec![
            Field::new("id", Type::signed64()),
            Field::new("name", Type::String),
        ]);
        assert_eq!(s.to_string(), "{id: signed<64>, name: string}");
    }

    #[test]
    fn test_typedef_display() {
        let tdef = TypeDef::new(
            "Thosts",
            Type::Struct(vec![
                Field::new("id", Type::signed64()),
                Field::new("name", Type::String),
            ]),
        );
        assert_eq!(
            tdef.to_string(),
            "typedef Thosts = Thosts{id: signed<64>, name: string}"
        );
    }
}
