use serde::{Deserialize, Serialize};

/// A single transaction event as recorded in the ledger.
///
/// Every field is caller-supplied and stored exactly as given. The ledger
/// derives nothing: timestamps are opaque strings, balances are snapshots the
/// caller computed, and `reference` is not checked for uniqueness.
///
/// The serialized field names are part of the external contract. All fields
/// are snake_case except the two timestamps, which are `createdAt` and
/// `updatedAt` on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Caller-classified transaction kind, e.g. `"payment"`.
    pub txn_type: String,
    /// Free-text classification, e.g. `"repayment"`.
    pub purpose: String,
    /// Transaction value in the system's base unit.
    pub amount: u64,
    /// Account the transaction belongs to.
    pub user: String,
    /// Caller-supplied identifier, intended (not enforced) to be unique.
    pub reference: String,
    /// User balance before the transaction.
    pub balance_before: u64,
    /// User balance after the transaction.
    pub balance_after: u64,
    /// Free-text lifecycle label, e.g. `"Done"` or `"Pending"`.
    pub status: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}
