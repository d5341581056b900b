use txl_types::TransactionRecord;

use crate::error::LedgerError;

/// Write boundary for ledger append operations.
pub trait LedgerWriter: Send + Sync {
    /// Append `record` exactly as given at the end of the ledger.
    ///
    /// No field is validated: empty strings, zero amounts and duplicate
    /// references are all accepted.
    fn append(&self, record: TransactionRecord) -> Result<(), LedgerError>;
}

/// Read boundary for ledger queries.
///
/// Every method returns owned copies; nothing handed out can reach back
/// into the ledger.
pub trait LedgerReader: Send + Sync {
    /// Every record in insertion order.
    fn list_all(&self) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Records whose `user` equals `user` exactly, in insertion order.
    fn list_by_user(&self, user: &str) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// The earliest-inserted record whose `reference` equals `reference`.
    fn find_by_reference(&self, reference: &str)
        -> Result<Option<TransactionRecord>, LedgerError>;

    /// Number of records in the ledger.
    fn count(&self) -> Result<u64, LedgerError>;
}
