//! In-memory test engine
//!
//! A [`DeltaEngine`] implementation faithful to the command interface:
//! relations registered under the compiler's prefixed names, a transaction
//! buffer, and a commit that replays the buffered updates as a change
//! stream. Views are modeled as mirrors: an update that lands in an input
//! relation emits the same change for every relation mirroring it.
//!
//! Delete-by-key commands resolve against the committed facts using the
//! relation's configured key ordinals, so deleting an absent key is a
//! no-op, exactly as repeated deletes should be.

use ddlog_engine::{DeltaEngine, EngineError, Record, RelId, Update, UpdateKind};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    names: Vec<String>,
    ids: HashMap<String, RelId>,
    mirrors: HashMap<RelId, Vec<RelId>>,
    keys: HashMap<RelId, Vec<usize>>,
    facts: HashMap<RelId, Vec<Record>>,
    tx: Option<Vec<Update>>,
}

/// An in-memory engine for exercising the DML runtime
#[derive(Default)]
pub struct TestEngine {
    state: Mutex<State>,
}

impl TestEngine {
    /// Create an engine with no relations
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, EngineError> {
        self.state
            .lock()
            .map_err(|_| EngineError::Internal("poisoned engine lock".to_string()))
    }

    /// Register a relation under its engine name, returning its id
    pub fn add_relation(&self, name: &str) -> RelId {
        let mut state = self.state.lock().expect("engine lock");
        let relid = state.names.len();
        state.names.push(name.to_string());
        state.ids.insert(name.to_string(), relid);
        relid
    }

    /// Stream changes of `from` into `to` as well (an identity view)
    pub fn mirror(&self, from: &str, to: &str) {
        let mut state = self.state.lock().expect("engine lock");
        let from = state.ids[from];
        let to = state.ids[to];
        state.mirrors.entry(from).or_default().push(to);
    }

    /// Configure the struct-field ordinals delete-by-key commands match on
    pub fn set_key(&self, name: &str, ordinals: &[usize]) {
        let mut state = self.state.lock().expect("engine lock");
        let relid = state.ids[name];
        state.keys.insert(relid, ordinals.to_vec());
    }

    /// Committed facts of a relation, in insertion order
    pub fn committed(&self, name: &str) -> Vec<Record> {
        let state = self.state.lock().expect("engine lock");
        let relid = state.ids[name];
        state.facts.get(&relid).cloned().unwrap_or_default()
    }
}

/// Extract the key of a record: the configured struct fields, as a tuple
/// when the key has more than one column
fn key_of(record: &Record, ordinals: &[usize]) -> Option<Record> {
    if ordinals.len() == 1 {
        return record.struct_field(ordinals[0]).cloned();
    }
    let mut parts = Vec::with_capacity(ordinals.len());
    for &ordinal in ordinals {
        parts.push(record.struct_field(ordinal)?.clone());
    }
    Some(Record::make_tuple(parts))
}

impl DeltaEngine for TestEngine {
    fn get_table_id(&self, name: &str) -> Result<RelId, EngineError> {
        let state = self.lock()?;
        state
            .ids
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownRelation(name.to_string()))
    }

    fn get_table_name(&self, relid: RelId) -> Result<String, EngineError> {
        let state = self.lock()?;
        state
            .names
            .get(relid)
            .cloned()
            .ok_or(EngineError::UnknownRelationId(relid))
    }

    fn transaction_start(&self) -> Result<(), EngineError> {
        let mut state = self.lock()?;
        if state.tx.is_some() {
            return Err(EngineError::TransactionInProgress);
        }
        state.tx = Some(Vec::new());
        Ok(())
    }

    fn apply_updates(&self, updates: &[Update]) -> Result<(), EngineError> {
        let mut state = self.lock()?;
        state
            .tx
            .as_mut()
            .ok_or(EngineError::NoTransaction)?
            .extend_from_slice(updates);
        Ok(())
    }

    fn transaction_commit_dump_changes(
        &self,
        on_change: &mut dyn FnMut(&Update),
    ) -> Result<(), EngineError> {
        let changes = {
            let mut state = self.lock()?;
            let updates = state.tx.take().ok_or(EngineError::NoTransaction)?;
            let mirrors = state.mirrors.clone();
            let keys = state.keys.clone();

            let mut changes: Vec<Update> = Vec::new();
            for update in updates {
                let targets = mirrors.get(&update.relid).cloned().unwrap_or_default();
                let facts = state.facts.entry(update.relid).or_default();
                match update.kind {
                    UpdateKind::Insert => {
                        if !facts.contains(&update.record) {
                            facts.push(update.record.clone());
                            for target in targets {
                                changes.push(Update::new(
                                    UpdateKind::Insert,
                                    target,
                                    update.record.clone(),
                                ));
                            }
                        }
                    }
                    UpdateKind::DeleteKey => {
                        let ordinals = keys.get(&update.relid).cloned().ok_or_else(|| {
                            EngineError::Internal(format!(
                                "relation {} has no key configured",
                                update.relid
                            ))
                        })?;
                        let position = facts
                            .iter()
                            .position(|r| key_of(r, &ordinals).as_ref() == Some(&update.record));
                        if let Some(position) = position {
                            let removed = facts.remove(position);
                            for target in targets {
                                changes.push(Update::new(
                                    UpdateKind::DeleteVal,
                                    target,
                                    removed.clone(),
                                ));
                            }
                        }
                    }
                    UpdateKind::DeleteVal => {
                        if let Some(position) = facts.iter().position(|r| *r == update.record) {
                            let removed = facts.remove(position);
                            for target in targets {
                                changes.push(Update::new(
                                    UpdateKind::DeleteVal,
                                    target,
                                    removed.clone(),
                                ));
                            }
                        }
                    }
                }
            }
            changes
        };

        // The lock is released before the callback runs; the callback is
        // free to resolve relation names through the engine.
        for change in &changes {
            on_change(change);
        }
        Ok(())
    }

    fn transaction_rollback(&self) -> Result<(), EngineError> {
        let mut state = self.lock()?;
        state.tx.take().ok_or(EngineError::NoTransaction)?;
        Ok(())
    }
}
