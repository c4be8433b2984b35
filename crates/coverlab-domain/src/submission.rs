//! Submission pipeline: validate → mean → interval → record.
//!
//! Pure; persisting the record is the caller's job.

use crate::interval::{compute_interval, IntervalResult};
use crate::level::ConfidenceLevel;
use crate::params::PopulationParameters;
use crate::record::LedgerRecord;
use crate::validation::{validate, Sample, ValidationError};

/// Everything produced by one accepted submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Validated input
    pub sample: Sample,
    /// Computed interval
    pub result: IntervalResult,
    /// Row to append to the ledger
    pub record: LedgerRecord,
}

/// Run one submission through validation and the interval calculator
///
/// # Examples
///
/// ```
/// use coverlab_domain::{process_submission, ConfidenceLevel, PopulationParameters};
///
/// let params = PopulationParameters::default();
/// let raw = vec!["100"; 30].join(" ");
/// let submission =
///     process_submission(&params, "alice", &raw, ConfidenceLevel::NinetyFive).unwrap();
/// assert!(submission.record.captures_mean);
/// ```
pub fn process_submission(
    params: &PopulationParameters,
    student_id: &str,
    raw_values: &str,
    level: ConfidenceLevel,
) -> Result<Submission, ValidationError> {
    let sample = validate(student_id, raw_values, params)?;
    let result = compute_interval(sample.mean(), level, params);
    let record = LedgerRecord::from_result(sample.student_id(), &result);

    Ok(Submission {
        sample,
        result,
        record,
    })
}
