use std::sync::RwLock;

use txl_types::TransactionRecord;

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordLog;

/// In-memory, `Vec`-based record log.
///
/// Intended for tests and embedding. Records are held behind a `RwLock` and
/// cloned on read and write. Nothing survives the process.
pub struct InMemoryRecordLog {
    records: RwLock<Vec<TransactionRecord>>,
}

impl InMemoryRecordLog {
    /// Create a new empty in-memory log.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryRecordLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordLog for InMemoryRecordLog {
    fn append(&self, record: &TransactionRecord) -> StoreResult<u64> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.push(record.clone());
        Ok((records.len() - 1) as u64)
    }

    fn get(&self, position: u64) -> StoreResult<Option<TransactionRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(usize::try_from(position)
            .ok()
            .and_then(|index| records.get(index))
            .cloned())
    }

    fn len(&self) -> StoreResult<u64> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.len() as u64)
    }

    fn scan(&self) -> StoreResult<Vec<TransactionRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.clone())
    }
}

impl std::fmt::Debug for InMemoryRecordLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryRecordLog")
            .field("record_count", &count)
            .finish()
    }
}
