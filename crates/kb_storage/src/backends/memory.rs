use kb_core::{Error, Result, SearchRecord, SearchStore};
use std::sync::{Arc, RwLock};
use tracing::debug;

struct MemoryStore {
    records: Vec<SearchRecord>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    fn append(&mut self, record: SearchRecord) {
        self.records.push(record);
    }

    fn snapshot(&self) -> Vec<SearchRecord> {
        self.records.clone()
    }

    fn clear(&mut self) {
        self.records.clear();
    }
}

/// Process-local search history guarded by a single reader/writer lock.
///
/// Saves and clears take the write lock, listing takes the read lock and
/// copies out, so callers never alias the stored records. The lock is held
/// only for the in-memory operation itself. Cloning shares the same history.
#[derive(Clone)]
pub struct InMemorySearchStore {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemorySearchStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }

    pub fn len(&self) -> Result<usize> {
        let store = self.store.read().map_err(|_| poisoned())?;
        Ok(store.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemorySearchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemorySearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySearchStore")
            .field("records", &self.len().unwrap_or_default())
            .finish()
    }
}

fn poisoned() -> Error {
    Error::Storage("search history lock poisoned".to_string())
}

impl SearchStore for InMemorySearchStore {
    fn save(&self, query: &str, answer: &str, relevant_ids: &[String]) -> Result<SearchRecord> {
        // Built outside the lock; only the push is serialized.
        let record = SearchRecord::new(query, answer, relevant_ids);
        let mut store = self.store.write().map_err(|_| poisoned())?;
        store.append(record.clone());
        debug!("Saved search record {} ({} total)", record.id, store.records.len());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<SearchRecord>> {
        let store = self.store.read().map_err(|_| poisoned())?;
        Ok(store.snapshot())
    }

    fn clear(&self) -> Result<()> {
        let mut store = self.store.write().map_err(|_| poisoned())?;
        store.clear();
        Ok(())
    }
}
