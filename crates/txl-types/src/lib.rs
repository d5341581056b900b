//! Foundation types for the transaction ledger (TXL).
//!
//! Every other TXL crate depends on `txl-types`. It defines the record
//! schema that crosses every boundary in the system, from the on-disk log to
//! the HTTP API.
//!
//! # Key Types
//!
//! - [`TransactionRecord`] -- one immutable transaction event

pub mod record;

pub use record::TransactionRecord;
