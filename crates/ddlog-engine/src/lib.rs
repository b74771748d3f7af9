//! Deductive engine command interface
//!
//! The engine itself is an external collaborator; this crate defines only
//! the surface the DML runtime drives: relation identity lookups, the
//! transaction protocol, and the `(kind, relation-id, record)` command
//! shape used both for updates pushed in and for changes streamed back
//! after a commit.

mod record;

use serde::{Deserialize, Serialize};

pub use record::Record;

/// Engine-side relation identifier
pub type RelId = usize;

/// The kind of an update or change command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateKind {
    /// Insert a record
    Insert,
    /// Delete by primary key match-expression
    DeleteKey,
    /// Delete a record by value
    DeleteVal,
}

/// A command: an update pushed to the engine, or a change streamed back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub kind: UpdateKind,
    pub relid: RelId,
    pub record: Record,
}

impl Update {
    /// Create a new command
    pub fn new(kind: UpdateKind, relid: RelId, record: Record) -> Self {
        Update {
            kind,
            relid,
            record,
        }
    }
}

/// Errors surfaced by the engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown relation {0}")]
    UnknownRelation(String),
    #[error("unknown relation id {0}")]
    UnknownRelationId(RelId),
    #[error("no transaction in progress")]
    NoTransaction,
    #[error("transaction already in progress")]
    TransactionInProgress,
    #[error("engine failure: {0}")]
    Internal(String),
}

/// The engine handle the DML runtime drives.
///
/// Calls may block on I/O. The handle is acquired by the caller and merely
/// borrowed by the dispatcher for the duration of a batch; implementations
/// synchronize internally.
pub trait DeltaEngine {
    /// Resolve an engine relation name to its id
    fn get_table_id(&self, name: &str) -> Result<RelId, EngineError>;

    /// Resolve a relation id back to its engine name
    fn get_table_name(&self, relid: RelId) -> Result<String, EngineError>;

    /// Open a transaction
    fn transaction_start(&self) -> Result<(), EngineError>;

    /// Apply updates inside the open transaction
    fn apply_updates(&self, updates: &[Update]) -> Result<(), EngineError>;

    /// Commit the open transaction and stream the resulting changes, in
    /// order, to the callback
    fn transaction_commit_dump_changes(
        &self,
        on_change: &mut dyn FnMut(&Update),
    ) -> Result<(), EngineError>;

    /// Roll the open transaction back, discarding its updates
    fn transaction_rollback(&self) -> Result<(), EngineError>;
}
