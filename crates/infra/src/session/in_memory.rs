use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;

use bookstore_auth::{ExecutionContext, authorize_write};
use bookstore_core::RecordId;

use super::criteria::Criteria;
use super::r#trait::{PersistenceError, Session};

type Table = BTreeMap<RecordId, JsonValue>;

#[derive(Debug, Clone)]
enum Change {
    Store {
        entity: &'static str,
        id: RecordId,
        row: JsonValue,
    },
    Delete {
        entity: &'static str,
        id: RecordId,
    },
}

impl Change {
    fn entity(&self) -> &'static str {
        match self {
            Change::Store { entity, .. } | Change::Delete { entity, .. } => *entity,
        }
    }

    fn apply(&self, table: &mut Table) {
        match self {
            Change::Store { id, row, .. } => {
                table.insert(id.clone(), row.clone());
            }
            Change::Delete { id, .. } => {
                table.remove(id);
            }
        }
    }
}

/// In-memory relational store shared by sessions.
///
/// Intended for tests/dev. Not optimized for performance: every read copies
/// the table it touches.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<HashMap<&'static str, Table>>,
    fail_commits: AtomicBool,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session running as `context`. Sessions start in autocommit mode.
    pub fn session(self: &Arc<Self>, context: Arc<ExecutionContext>) -> InMemorySession {
        InMemorySession {
            db: Arc::clone(self),
            context,
            unflushed: Vec::new(),
            flushed: Vec::new(),
            autocommit: true,
        }
    }

    /// Make every subsequent commit fail (storage outage simulation).
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Committed rows of an entity, ordered by id.
    pub fn rows(&self, entity: &str) -> Result<Vec<JsonValue>, PersistenceError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| PersistenceError::Connection("lock poisoned".to_string()))?;
        Ok(tables
            .get(entity)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    fn table(&self, entity: &'static str) -> Result<Table, PersistenceError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| PersistenceError::Connection("lock poisoned".to_string()))?;
        Ok(tables.get(entity).cloned().unwrap_or_default())
    }

    fn apply(&self, changes: &[Change]) -> Result<(), PersistenceError> {
        if changes.is_empty() {
            return Ok(());
        }
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(PersistenceError::Connection("commit rejected by storage".to_string()));
        }

        let mut tables = self
            .tables
            .write()
            .map_err(|_| PersistenceError::Connection("lock poisoned".to_string()))?;

        // All changes land under one write lock: readers see all or nothing.
        for change in changes {
            change.apply(tables.entry(change.entity()).or_default());
        }
        Ok(())
    }
}

/// Session over an [`InMemoryDatabase`].
#[derive(Debug)]
pub struct InMemorySession {
    db: Arc<InMemoryDatabase>,
    context: Arc<ExecutionContext>,
    unflushed: Vec<Change>,
    flushed: Vec<Change>,
    autocommit: bool,
}

impl InMemorySession {
    /// Number of staged (not yet committed) changes.
    pub fn pending_changes(&self) -> usize {
        self.unflushed.len() + self.flushed.len()
    }

    /// Committed table overlaid with this session's staged changes.
    fn view(&self, entity: &'static str) -> Result<Table, PersistenceError> {
        let mut table = self.db.table(entity)?;
        for change in self.flushed.iter().chain(&self.unflushed) {
            if change.entity() == entity {
                change.apply(&mut table);
            }
        }
        Ok(table)
    }

    fn commit_staged(&mut self) -> Result<(), PersistenceError> {
        let staged: Vec<Change> = self.flushed.iter().chain(&self.unflushed).cloned().collect();
        self.db.apply(&staged)?;
        tracing::debug!(changes = staged.len(), "session committed");
        self.flushed.clear();
        self.unflushed.clear();
        Ok(())
    }
}

impl Session for InMemorySession {
    fn context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }

    fn load(&self, entity: &'static str, id: &RecordId) -> Result<Option<JsonValue>, PersistenceError> {
        Ok(self.view(entity)?.remove(id))
    }

    fn query(&self, entity: &'static str, criteria: &Criteria) -> Result<Vec<JsonValue>, PersistenceError> {
        let rows = self
            .view(entity)?
            .into_values()
            .filter(|row| criteria.matches(row));

        Ok(match criteria.limit() {
            Some(max) => rows.take(max).collect(),
            None => rows.collect(),
        })
    }

    fn store(&mut self, entity: &'static str, id: RecordId, row: JsonValue) -> Result<(), PersistenceError> {
        authorize_write(&self.context, entity)?;
        self.unflushed.push(Change::Store { entity, id, row });
        Ok(())
    }

    fn delete(&mut self, entity: &'static str, id: &RecordId) -> Result<bool, PersistenceError> {
        authorize_write(&self.context, entity)?;
        if !self.view(entity)?.contains_key(id) {
            return Ok(false);
        }
        self.unflushed.push(Change::Delete {
            entity,
            id: id.clone(),
        });
        Ok(true)
    }

    fn flush(&mut self) -> Result<(), PersistenceError> {
        self.flushed.append(&mut self.unflushed);
        if self.autocommit {
            self.commit_staged()?;
        }
        Ok(())
    }

    fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    /// Switching autocommit back on commits flushed work, like a JDBC connection.
    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), PersistenceError> {
        if autocommit && !self.autocommit && !self.flushed.is_empty() {
            let flushed = std::mem::take(&mut self.flushed);
            if let Err(e) = self.db.apply(&flushed) {
                self.flushed = flushed;
                return Err(e);
            }
        }
        self.autocommit = autocommit;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), PersistenceError> {
        if self.autocommit {
            return Err(PersistenceError::Transaction(
                "commit called while autocommit is enabled".to_string(),
            ));
        }
        self.commit_staged()
    }

    fn rollback(&mut self) -> Result<(), PersistenceError> {
        let discarded = self.pending_changes();
        self.flushed.clear();
        self.unflushed.clear();
        tracing::debug!(discarded, "session rolled back");
        Ok(())
    }
}
