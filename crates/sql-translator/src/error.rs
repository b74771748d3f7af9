//! Translation errors
//!
//! Translation errors abort compilation of the containing statement and
//! carry a rendering of the offending AST node for diagnostics. At DDL time
//! they abort initialization.

use ddlog_ir::IrError;

/// Errors raised while compiling DDL into the relational IR
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslationError {
    /// Malformed DDL text
    #[error("failed to parse DDL statement {statement:?}: {message}")]
    Parse { statement: String, message: String },

    /// Syntactically valid but outside the supported grammar subset
    #[error("{construct} not supported: {node}")]
    Unsupported { construct: String, node: String },

    /// Reference to a relation that was never declared
    #[error("could not find relation {name}")]
    UnknownRelation { name: String },

    /// Column reference that resolves in no enclosing scope
    #[error("column {name} is not in scope")]
    UnknownColumn { name: String },

    /// Two projected columns resolved to the same name
    #[error("duplicate column {name} in projection")]
    DuplicateProjection { name: String },

    /// Two columns of one table share a name
    #[error("duplicate field {field} in type {ty}")]
    DuplicateField { ty: String, field: String },

    /// A second type-def or relation was emitted under an existing name
    #[error("duplicate declaration of {0}")]
    DuplicateDeclaration(String),

    /// A relation's row type does not resolve to a registered struct type-def
    #[error("type {0} does not resolve to a struct type-def")]
    UnresolvedType(String),

    /// IR-level invariant violation
    #[error(transparent)]
    Invariant(#[from] IrError),
}

impl TranslationError {
    /// Convenience constructor for unsupported-construct errors
    pub fn unsupported(construct: &str, node: impl std::fmt::Debug) -> Self {
        TranslationError::Unsupported {
            construct: construct.to_string(),
            node: format!("{:?}", node),
        }
    }
}
