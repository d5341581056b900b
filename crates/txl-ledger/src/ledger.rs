use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use txl_store::{InMemoryRecordLog, RecordLog};
use txl_types::TransactionRecord;

use crate::error::LedgerError;
use crate::index::LedgerIndex;
use crate::traits::{LedgerReader, LedgerWriter};

/// Append-only transaction ledger over a [`RecordLog`].
///
/// The index lock is the ledger's serialization point. An append holds the
/// write lock across both the log append and the index update. A query holds
/// the read lock for its whole duration, so it sees the ledger either
/// entirely before or entirely after any append.
///
/// The ledger assumes it is the only writer to its log.
pub struct Ledger {
    log: Arc<dyn RecordLog>,
    index: RwLock<LedgerIndex>,
}

impl Ledger {
    /// Open a ledger over `log`, rebuilding the indexes from its contents.
    pub fn open(log: Arc<dyn RecordLog>) -> Result<Self, LedgerError> {
        let records = log.scan()?;
        let index = LedgerIndex::rebuild(&records);
        info!(records = index.len(), "ledger opened");
        Ok(Self {
            log,
            index: RwLock::new(index),
        })
    }

    /// An empty, non-durable ledger for tests and embedding.
    pub fn in_memory() -> Self {
        Self {
            log: Arc::new(InMemoryRecordLog::new()),
            index: RwLock::new(LedgerIndex::default()),
        }
    }

    fn read_index(&self) -> Result<RwLockReadGuard<'_, LedgerIndex>, LedgerError> {
        self.index.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_index(&self) -> Result<RwLockWriteGuard<'_, LedgerIndex>, LedgerError> {
        self.index.write().map_err(|_| LedgerError::LockPoisoned)
    }

    fn fetch(&self, position: u64) -> Result<TransactionRecord, LedgerError> {
        self.log
            .get(position)?
            .ok_or(LedgerError::IndexOutOfSync { position })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl LedgerWriter for Ledger {
    fn append(&self, record: TransactionRecord) -> Result<(), LedgerError> {
        let mut index = self.write_index()?;

        let position = self.log.append(&record)?;
        if position != index.len() {
            return Err(LedgerError::IndexOutOfSync { position });
        }
        index.insert(position, &record);

        debug!(position, user = %record.user, reference = %record.reference, "transaction appended");
        Ok(())
    }
}

impl LedgerReader for Ledger {
    fn list_all(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        let index = self.read_index()?;
        let mut records = self.log.scan()?;
        let len = index.len() as usize;
        if records.len() < len {
            return Err(LedgerError::IndexOutOfSync {
                position: records.len() as u64,
            });
        }
        records.truncate(len);
        Ok(records)
    }

    fn list_by_user(&self, user: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
        let index = self.read_index()?;
        let positions = index.user_positions(user);
        if positions.is_empty() {
            return Ok(Vec::new());
        }

        self.log
            .get_batch(positions)?
            .into_iter()
            .zip(positions)
            .map(|(record, position)| {
                record.ok_or(LedgerError::IndexOutOfSync {
                    position: *position,
                })
            })
            .collect()
    }

    fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let index = self.read_index()?;
        index
            .first_position(reference)
            .map(|position| self.fetch(position))
            .transpose()
    }

    fn count(&self) -> Result<u64, LedgerError> {
        Ok(self.read_index()?.len())
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.count().unwrap_or_default();
        f.debug_struct("Ledger")
            .field("record_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use txl_store::{FileRecordLog, LogConfig};

    use super::*;

    fn txn(user: &str, reference: &str, amount: u64) -> TransactionRecord {
        TransactionRecord {
            txn_type: "payment".into(),
            purpose: "repayment".into(),
            amount,
            user: user.into(),
            reference: reference.into(),
            balance_before: 100_000,
            balance_after: 100_000 - amount,
            status: "Done".into(),
            description: String::new(),
            created_at: "2023-01-01T00:00:00Z".into(),
            updated_at: "2023-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn single_record_is_listed_and_found() {
        let ledger = Ledger::in_memory();
        let record = txn("Bala", "value2", 20_000);
        ledger.append(record.clone()).unwrap();

        assert_eq!(ledger.list_all().unwrap(), vec![record.clone()]);
        assert_eq!(ledger.find_by_reference("value2").unwrap(), Some(record));
        assert_eq!(ledger.find_by_reference("missing").unwrap(), None);
    }

    #[test]
    fn user_filter_keeps_relative_order() {
        let ledger = Ledger::in_memory();
        let b1 = txn("Bala", "b1", 1);
        let a1 = txn("Ada", "a1", 2);
        let b2 = txn("Bala", "b2", 3);
        let a2 = txn("Ada", "a2", 4);
        for r in [&b1, &a1, &b2, &a2] {
            ledger.append(r.clone()).unwrap();
        }

        assert_eq!(ledger.list_by_user("Bala").unwrap(), vec![b1, b2]);
        assert_eq!(ledger.list_by_user("Ada").unwrap(), vec![a1, a2]);
        assert!(ledger.list_by_user("Carl").unwrap().is_empty());
    }

    #[test]
    fn duplicate_reference_returns_first() {
        let ledger = Ledger::in_memory();
        let first = txn("Bala", "dup", 10);
        let second = txn("Ada", "dup", 99);
        ledger.append(first.clone()).unwrap();
        ledger.append(second).unwrap();

        assert_eq!(ledger.find_by_reference("dup").unwrap(), Some(first));
        assert_eq!(ledger.count().unwrap(), 2);
    }

    #[test]
    fn empty_ledger_answers_empty() {
        let ledger = Ledger::in_memory();
        assert!(ledger.list_all().unwrap().is_empty());
        assert!(ledger.list_by_user("anyone").unwrap().is_empty());
        assert!(ledger.find_by_reference("anything").unwrap().is_none());
        assert_eq!(ledger.count().unwrap(), 0);
    }

    #[test]
    fn user_match_is_exact() {
        let ledger = Ledger::in_memory();
        ledger.append(txn("Bala", "r1", 1)).unwrap();

        assert!(ledger.list_by_user("bala").unwrap().is_empty());
        assert!(ledger.list_by_user(" Bala").unwrap().is_empty());
        assert!(ledger.find_by_reference("R1").unwrap().is_none());
    }

    #[test]
    fn degenerate_input_is_accepted() {
        let ledger = Ledger::in_memory();
        let blank = TransactionRecord::default();
        ledger.append(blank.clone()).unwrap();
        ledger.append(blank.clone()).unwrap();

        assert_eq!(ledger.count().unwrap(), 2);
        assert_eq!(ledger.list_by_user("").unwrap().len(), 2);
        assert_eq!(ledger.find_by_reference("").unwrap(), Some(blank));
    }

    #[test]
    fn returned_records_are_copies() {
        let ledger = Ledger::in_memory();
        let original = txn("Bala", "r1", 500);
        ledger.append(original.clone()).unwrap();

        let mut listed = ledger.list_all().unwrap();
        listed[0].amount = 1;
        listed[0].balance_after = 0;
        listed.clear();

        let mut found = ledger.find_by_reference("r1").unwrap().unwrap();
        found.status = "Reversed".into();

        assert_eq!(ledger.list_all().unwrap(), vec![original.clone()]);
        assert_eq!(ledger.find_by_reference("r1").unwrap(), Some(original));
    }

    #[test]
    fn file_backed_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            txn("Bala", "dup", 1),
            txn("Ada", "x", 2),
            txn("Bala", "dup", 3),
        ];

        {
            let log = Arc::new(FileRecordLog::open_in(dir.path(), LogConfig::default()).unwrap());
            let ledger = Ledger::open(log).unwrap();
            for r in &records {
                ledger.append(r.clone()).unwrap();
            }
        }

        let log = Arc::new(FileRecordLog::open_in(dir.path(), LogConfig::default()).unwrap());
        let ledger = Ledger::open(log).unwrap();

        assert_eq!(ledger.list_all().unwrap(), records);
        assert_eq!(ledger.count().unwrap(), 3);
        assert_eq!(
            ledger.list_by_user("Bala").unwrap(),
            vec![records[0].clone(), records[2].clone()]
        );
        assert_eq!(
            ledger.find_by_reference("dup").unwrap(),
            Some(records[0].clone())
        );

        ledger.append(txn("Carl", "y", 4)).unwrap();
        assert_eq!(ledger.count().unwrap(), 4);
    }

    #[test]
    fn foreign_log_writes_are_detected() {
        let log = Arc::new(InMemoryRecordLog::new());
        let ledger = Ledger::open(log.clone()).unwrap();
        ledger.append(txn("Bala", "r1", 1)).unwrap();

        log.append(&txn("Eve", "sneaky", 1)).unwrap();

        let error = ledger.append(txn("Bala", "r2", 1)).unwrap_err();
        assert!(matches!(error, LedgerError::IndexOutOfSync { position: 2 }));
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 50;

        let ledger = Arc::new(Ledger::in_memory());
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        ledger
                            .append(txn(&format!("user-{t}"), &format!("{t}-{i}"), i as u64))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.count().unwrap(), (THREADS * PER_THREAD) as u64);
        assert_eq!(ledger.list_all().unwrap().len(), THREADS * PER_THREAD);
        for t in 0..THREADS {
            let amounts: Vec<_> = ledger
                .list_by_user(&format!("user-{t}"))
                .unwrap()
                .into_iter()
                .map(|r| r.amount)
                .collect();
            assert_eq!(amounts, (0..PER_THREAD as u64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn readers_see_consistent_snapshots() {
        let ledger = Arc::new(Ledger::in_memory());
        let writer = {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for i in 0..200u64 {
                    ledger.append(txn("Bala", &format!("r{i}"), i)).unwrap();
                }
            })
        };

        let mut last_len = 0;
        while last_len < 200 {
            let all = ledger.list_all().unwrap();
            assert!(all.len() >= last_len);
            for (i, record) in all.iter().enumerate() {
                assert_eq!(record.amount, i as u64);
            }
            last_len = all.len();
        }
        writer.join().unwrap();
    }
}
