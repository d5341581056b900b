//! Append-only record storage for the transaction ledger.
//!
//! This crate is the persistence substrate underneath the ledger. It stores
//! the `TRANSACTIONS` collection as an ordered log of
//! [`TransactionRecord`](txl_types::TransactionRecord) values, addressed by
//! a zero-based position.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordLog`] trait:
//!
//! - [`InMemoryRecordLog`] -- `Vec`-based log for tests and embedding
//! - [`FileRecordLog`] -- length/CRC framed segment file with crash recovery
//!
//! # Design Rules
//!
//! 1. The log only grows. There is no delete, truncate or overwrite API.
//! 2. A position, once assigned, always resolves to the same record.
//! 3. An append is visible to readers as soon as it returns.
//! 4. The store never interprets record contents.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

/// Internal identifier of the collection holding transaction records.
pub const TRANSACTIONS_COLLECTION: &str = "TRANSACTIONS";

pub use config::{LogConfig, SyncMode};
pub use error::{StoreError, StoreResult};
pub use file::FileRecordLog;
pub use memory::InMemoryRecordLog;
pub use traits::RecordLog;
