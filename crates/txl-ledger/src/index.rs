use std::collections::HashMap;

use txl_types::TransactionRecord;

/// Secondary indexes over the record log.
///
/// Positions under each user are kept in ascending order because they are
/// inserted in append order. Only the first position is kept per reference.
#[derive(Debug, Default)]
pub(crate) struct LedgerIndex {
    len: u64,
    by_user: HashMap<String, Vec<u64>>,
    first_by_reference: HashMap<String, u64>,
}

impl LedgerIndex {
    pub(crate) fn rebuild(records: &[TransactionRecord]) -> Self {
        let mut index = Self::default();
        for (position, record) in records.iter().enumerate() {
            index.insert(position as u64, record);
        }
        index
    }

    /// Record that `record` now lives at `position` (must equal `len()`).
    pub(crate) fn insert(&mut self, position: u64, record: &TransactionRecord) {
        debug_assert_eq!(position, self.len);
        self.by_user
            .entry(record.user.clone())
            .or_default()
            .push(position);
        self.first_by_reference
            .entry(record.reference.clone())
            .or_insert(position);
        self.len = position + 1;
    }

    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    pub(crate) fn user_positions(&self, user: &str) -> &[u64] {
        self.by_user.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn first_position(&self, reference: &str) -> Option<u64> {
        self.first_by_reference.get(reference).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, reference: &str) -> TransactionRecord {
        TransactionRecord {
            user: user.into(),
            reference: reference.into(),
            ..TransactionRecord::default()
        }
    }

    #[test]
    fn first_reference_wins() {
        let index = LedgerIndex::rebuild(&[
            record("a", "dup"),
            record("b", "x"),
            record("c", "dup"),
        ]);
        assert_eq!(index.first_position("dup"), Some(0));
        assert_eq!(index.first_position("x"), Some(1));
        assert_eq!(index.first_position("missing"), None);
    }

    #[test]
    fn user_positions_are_ordered() {
        let index = LedgerIndex::rebuild(&[
            record("Bala", "1"),
            record("Ada", "2"),
            record("Bala", "3"),
            record("Ada", "4"),
        ]);
        assert_eq!(index.user_positions("Bala"), &[0, 2]);
        assert_eq!(index.user_positions("Ada"), &[1, 3]);
        assert!(index.user_positions("Carl").is_empty());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn empty_keys_are_indexed() {
        let index = LedgerIndex::rebuild(&[record("", "")]);
        assert_eq!(index.user_positions(""), &[0]);
        assert_eq!(index.first_position(""), Some(0));
    }
}
