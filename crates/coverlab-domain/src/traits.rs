//! Trait definitions for external interactions
//!
//! The ledger is the only collaborator the domain needs. Implementations
//! live in coverlab-store.

use crate::LedgerRecord;
use std::fmt;

/// Errors raised by ledger backends
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Backing store cannot be reached; retry later
    Unavailable(String),
    /// Stored data does not match the record schema
    MalformedRecord(String),
}

impl LedgerError {
    /// Whether the caller should show a "reconnecting" state and retry
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_))
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Unavailable(msg) => write!(f, "ledger unavailable: {}", msg),
            LedgerError::MalformedRecord(msg) => write!(f, "malformed ledger record: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Append-only store of submission records
///
/// Implementations must never reorder, mutate or delete existing records.
pub trait ResultsLedger {
    /// Append one record after every record already stored
    fn append_record(&mut self, record: LedgerRecord) -> Result<(), LedgerError>;

    /// All visible records in insertion order.
    ///
    /// Rows lacking a student identifier are excluded.
    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError>;
}

impl<L: ResultsLedger + ?Sized> ResultsLedger for Box<L> {
    fn append_record(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        (**self).append_record(record)
    }

    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        (**self).read_all()
    }
}
