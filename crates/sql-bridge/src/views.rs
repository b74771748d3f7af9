//! Materialized view storage
//!
//! One order-preserving record set per output table, behind a concurrent
//! map. `SELECT` handlers read snapshots from any thread; the commit
//! callback is the only writer and holds per-table exclusive access for
//! the duration of each mutation. Insertion order is observable in
//! snapshots; removal is by structural equality.

use crate::Row;
use dashmap::DashMap;
use indexmap::IndexSet;

/// Materialized view sets, keyed by canonical (upper-case) table name
#[derive(Debug, Default)]
pub struct MaterializedViews {
    tables: DashMap<String, IndexSet<Row>>,
}

impl MaterializedViews {
    /// Create an empty view store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to a table's set
    pub fn insert(&self, table: &str, row: Row) {
        self.tables.entry(table.to_string()).or_default().insert(row);
    }

    /// Remove a row from a table's set by structural equality
    pub fn remove(&self, table: &str, row: &Row) {
        if let Some(mut set) = self.tables.get_mut(table) {
            set.shift_remove(row);
        }
    }

    /// Snapshot a table's rows in insertion order
    pub fn snapshot(&self, table: &str) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}
