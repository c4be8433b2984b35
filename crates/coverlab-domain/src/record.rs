//! Ledger record and its durable column schema.
//!
//! Column names and the SÍ/NO capture flag are the contract with data
//! already stored in class spreadsheets, so they are kept verbatim.

use crate::interval::IntervalResult;
use crate::level::ConfidenceLevel;
use crate::traits::LedgerError;
use std::fmt;

/// Student identifier column
pub const COL_STUDENT_ID: &str = "ID_Estudiante";
/// Confidence level column ("95%")
pub const COL_CONFIDENCE_LEVEL: &str = "Nivel_Confianza";
/// Sample mean column
pub const COL_SAMPLE_MEAN: &str = "Media_Muestral";
/// Margin of error column
pub const COL_MARGIN_OF_ERROR: &str = "Margen_Error";
/// Lower bound column
pub const COL_LOWER_BOUND: &str = "LI";
/// Upper bound column
pub const COL_UPPER_BOUND: &str = "LS";
/// Capture flag column ("SÍ" / "NO")
pub const COL_CAPTURES_MEAN: &str = "Captura_Mu";

/// Persisted columns, in order
pub const COLUMNS: [&str; 7] = [
    COL_STUDENT_ID,
    COL_CONFIDENCE_LEVEL,
    COL_SAMPLE_MEAN,
    COL_MARGIN_OF_ERROR,
    COL_LOWER_BOUND,
    COL_UPPER_BOUND,
    COL_CAPTURES_MEAN,
];

/// Persisted form of the capture flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capture {
    /// Interval contains μ
    Si,
    /// Interval misses μ
    No,
}

impl Capture {
    /// Stored text
    pub fn as_str(&self) -> &'static str {
        match self {
            Capture::Si => "SÍ",
            Capture::No => "NO",
        }
    }

    /// Parse stored text; tolerates a missing accent and any case
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let stored = s.trim();
        match stored.to_uppercase().as_str() {
            "SÍ" | "SI" => Ok(Capture::Si),
            "NO" => Ok(Capture::No),
            _ => Err(LedgerError::MalformedRecord(format!(
                "{} must be SÍ or NO, got '{}'",
                COL_CAPTURES_MEAN, stored
            ))),
        }
    }

    /// Boolean view
    pub fn captured(&self) -> bool {
        matches!(self, Capture::Si)
    }
}

impl From<bool> for Capture {
    fn from(captured: bool) -> Self {
        if captured {
            Capture::Si
        } else {
            Capture::No
        }
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the shared ledger: who submitted and what they got.
///
/// Created once per accepted submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    /// Submitting student
    pub student_id: String,
    /// Level the interval was built at
    pub confidence_level: ConfidenceLevel,
    /// Sample mean
    pub sample_mean: f64,
    /// Margin of error
    pub margin_of_error: f64,
    /// Lower bound
    pub lower_bound: f64,
    /// Upper bound
    pub upper_bound: f64,
    /// Whether the interval captured μ
    pub captures_mean: bool,
}

impl LedgerRecord {
    /// Build the row for a computed interval
    pub fn from_result(student_id: impl Into<String>, result: &IntervalResult) -> Self {
        Self {
            student_id: student_id.into(),
            confidence_level: result.confidence_level,
            sample_mean: result.sample_mean,
            margin_of_error: result.margin_of_error,
            lower_bound: result.lower_bound,
            upper_bound: result.upper_bound,
            captures_mean: result.captures_mean,
        }
    }

    /// Capture flag in its persisted form
    pub fn capture(&self) -> Capture {
        Capture::from(self.captures_mean)
    }

    /// Rows without a student identifier are partial writes and never counted
    pub fn has_student_id(&self) -> bool {
        !self.student_id.trim().is_empty()
    }
}
