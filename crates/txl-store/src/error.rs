/// Errors from record log operations.
///
/// Every variant is a storage failure from the ledger's point of view: it is
/// surfaced to the caller and never retried.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A complete log entry failed its integrity check.
    #[error("corrupt log entry at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    /// A record exceeds the maximum encoded entry size.
    #[error("record of {size} bytes exceeds the {max} byte entry limit")]
    RecordTooLarge { size: usize, max: usize },

    /// A position inside `0..len` did not resolve to a record.
    #[error("position {position} missing from log of length {len}")]
    MissingPosition { position: u64, len: u64 },

    /// A failed append could not be rolled back; the file holds a partial
    /// entry at `offset`.
    #[error("record log unwritable: partial entry at offset {offset} could not be rolled back")]
    Unwritable { offset: u64 },

    /// A lock guarding the log was poisoned by a panicking writer.
    #[error("record log lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
