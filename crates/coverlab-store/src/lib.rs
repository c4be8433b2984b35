//! Coverlab Storage Layer
//!
//! Implements the [`ResultsLedger`] trait and the machinery that lets a whole
//! class share one ledger safely.
//!
//! # Architecture
//!
//! - [`MemoryLedger`] for a single process session
//! - [`SqliteLedger`] for a durable, append-only table
//! - [`LedgerWriter`] serializes every append through one worker
//! - [`CachedLedger`] serves read-heavy result pages with bounded staleness
//!
//! # Examples
//!
//! ```no_run
//! use coverlab_store::{CachedLedger, LedgerWriter, SqliteLedger};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = SqliteLedger::new("coverlab.db")?;
//! let handle = LedgerWriter::default().spawn(ledger);
//! let cache = CachedLedger::new(handle, Duration::from_secs(2));
//! let records = cache.read_all().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ResultsLedger`]: coverlab_domain::ResultsLedger

#![warn(missing_docs)]

mod cache;
mod memory;
mod sqlite;
mod writer;

pub use cache::CachedLedger;
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use writer::{LedgerHandle, LedgerWriter, DEFAULT_QUEUE_DEPTH, DEFAULT_TIMEOUT};

use coverlab_domain::LedgerError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data does not match the record schema
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => LedgerError::Unavailable(e.to_string()),
            StoreError::InvalidData(msg) => LedgerError::MalformedRecord(msg),
        }
    }
}
