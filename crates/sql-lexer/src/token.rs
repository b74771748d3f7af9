//! Token types shared by both SQL dialects

/// SQL Keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Queries
    Select,
    Distinct,
    From,
    Where,
    As,

    // DML
    Insert,
    Into,
    Values,
    Delete,

    // DDL
    Create,
    Table,
    View,

    // Data types
    Boolean,
    Integer,
    Bigint,
    Varchar,

    // Constraints
    Primary,
    Key,
    Not,
    Null,

    // Logical operators
    And,
    Or,

    // Boolean literals
    True,
    False,

    // Parsed so the translator can reject them by name
    Order,
    By,
    Limit,
    With,
}

impl Keyword {
    /// Try to parse a keyword from a string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "DISTINCT" => Some(Self::Distinct),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "AS" => Some(Self::As),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "DELETE" => Some(Self::Delete),
            "CREATE" => Some(Self::Create),
            "TABLE" => Some(Self::Table),
            "VIEW" => Some(Self::View),
            "BOOLEAN" => Some(Self::Boolean),
            "INTEGER" => Some(Self::Integer),
            "BIGINT" => Some(Self::Bigint),
            "VARCHAR" => Some(Self::Varchar),
            "PRIMARY" => Some(Self::Primary),
            "KEY" => Some(Self::Key),
            "NOT" => Some(Self::Not),
            "NULL" => Some(Self::Null),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "LIMIT" => Some(Self::Limit),
            "WITH" => Some(Self::With),
            _ => None,
        }
    }
}

/// A token in the SQL language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    // Keywords
    Keyword(Keyword),

    // Identifiers and literals
    Identifier(String),
    String(String),
    Integer(i64),

    // Punctuation
    LParen,      // (
    RParen,      // )
    Comma,       // ,
    Semicolon,   // ;
    Dot,         // .
    Star,        // *
    Placeholder, // ? (positional parameter, second dialect only)

    // Operators
    Minus, // -

    // Comparison
    Eq,    // =
    NotEq, // <> or !=
    Lt,    // <
    Gt,    // >
    LtEq,  // <=
    GtEq,  // >=
}
