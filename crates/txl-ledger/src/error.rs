use txl_store::StoreError;

/// Errors produced by ledger operations.
///
/// A lookup miss is not an error: `find_by_reference` returns `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("index out of sync with record log at position {position}")]
    IndexOutOfSync { position: u64 },

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
