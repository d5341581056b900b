//! Append-only transaction ledger (TXL).
//!
//! This crate is the heart of TXL. It provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries (append, list all,
//!   list by user, find by reference)
//! - [`Ledger`], the implementation over any [`RecordLog`](txl_store::RecordLog)
//! - Secondary indexes (user to positions, reference to first position) kept
//!   in lockstep with the log and rebuilt on open

pub mod error;
mod index;
pub mod ledger;
pub mod traits;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use traits::{LedgerReader, LedgerWriter};
