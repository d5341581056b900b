use txl_types::TransactionRecord;

use crate::error::{StoreError, StoreResult};

/// Durable append-only log of transaction records.
///
/// All implementations must satisfy these invariants:
/// - Positions are zero-based, dense and assigned in append order.
/// - Records are immutable once appended; a position always resolves to the
///   same record.
/// - Once `append` returns `Ok`, the record is visible to `get`, `len` and
///   `scan` (read-your-writes).
/// - All I/O errors are propagated, never silently ignored.
pub trait RecordLog: Send + Sync {
    /// Append a record at the end of the log and return its position.
    fn append(&self, record: &TransactionRecord) -> StoreResult<u64>;

    /// Read the record at `position`.
    ///
    /// Returns `Ok(None)` if the position is past the end of the log.
    fn get(&self, position: u64) -> StoreResult<Option<TransactionRecord>>;

    /// Number of records in the log.
    fn len(&self) -> StoreResult<u64>;

    /// Returns `true` if the log holds no records.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Read every record in position order.
    ///
    /// Default implementation calls `get()` for each position. Backends may
    /// override to read under a single lock acquisition. A hole inside
    /// `0..len` is an error, never skipped.
    fn scan(&self) -> StoreResult<Vec<TransactionRecord>> {
        let len = self.len()?;
        let mut records = Vec::with_capacity(len as usize);
        for position in 0..len {
            let record = self
                .get(position)?
                .ok_or(StoreError::MissingPosition { position, len })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Read the records at several positions, preserving the given order.
    ///
    /// Default implementation calls `get()` for each position.
    fn get_batch(&self, positions: &[u64]) -> StoreResult<Vec<Option<TransactionRecord>>> {
        positions.iter().map(|p| self.get(*p)).collect()
    }
}
