//! Coverlab Domain Layer
//!
//! Core statistics for the confidence-interval classroom exercise: each
//! student submits a sample, gets a known-σ Z-interval for the population
//! mean, and the class watches how many intervals actually capture μ.
//!
//! ## Key Concepts
//!
//! - **PopulationParameters**: μ, σ, n and the admissible value range, fixed at startup
//! - **Sample**: a validated set of n observations from one student
//! - **IntervalResult**: margin of error, bounds and the capture flag
//! - **LedgerRecord**: the durable row appended to the shared ledger
//! - **CoverageSummary**: captured / missed counts and the empirical error rate
//!
//! ## Architecture
//!
//! - Pure functions only; no I/O
//! - `statrs` is the single external dependency (standard normal quantile)
//! - Storage is reached through the [`traits::ResultsLedger`] trait,
//!   implemented in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coverage;
pub mod interval;
pub mod level;
pub mod params;
pub mod record;
pub mod submission;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use coverage::{summarize, summarize_by_level, CoverageSummary};
pub use interval::{compute, compute_interval, IntervalError, IntervalResult};
pub use level::ConfidenceLevel;
pub use params::{ParameterError, PopulationParameters};
pub use record::{Capture, LedgerRecord, COLUMNS};
pub use submission::{process_submission, Submission};
pub use traits::{LedgerError, ResultsLedger};
pub use validation::{validate, Sample, ValidationError};
