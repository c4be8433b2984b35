//! Coverlab Rust SDK
//!
//! Async client for the classroom service.
//!
//! # Example
//!
//! ```no_run
//! use coverlab_domain::ConfidenceLevel;
//! use coverlab_sdk::ClassroomClient;
//!
//! # async fn demo() -> Result<(), coverlab_sdk::SdkError> {
//! let client = ClassroomClient::new("http://localhost:8080")?;
//! let values = vec!["100"; 30].join(" ");
//! let outcome = client
//!     .submit("ana", &values, ConfidenceLevel::NinetyFive)
//!     .await?;
//! println!("[{}, {}]", outcome.result.lower_bound, outcome.result.upper_bound);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod types;

pub use client::{ClassroomClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::SdkError;
pub use types::{
    ClassSummary, CoverageCounts, Health, Interval, Parameters, Record, SubmitOutcome,
    SubmitRequest,
};
