//! Wire types exchanged with the classroom service.

use crate::error::SdkError;
use coverlab_domain::params::DEFAULT_POPULATION_MEAN;
use coverlab_domain::{Capture, ConfidenceLevel, IntervalResult, LedgerRecord, PopulationParameters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Submission request body
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    /// Student name or sample ID
    pub student_id: String,
    /// Raw values as typed
    pub values: String,
    /// Level in percent
    pub confidence_level: u32,
}

/// Interval computed by the service
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Interval {
    /// Level in percent
    pub confidence_level: u32,
    /// x̄
    pub sample_mean: f64,
    /// Margin of error
    pub margin_of_error: f64,
    /// Lower bound
    pub lower_bound: f64,
    /// Upper bound
    pub upper_bound: f64,
    /// Interval contains μ
    pub captures_mean: bool,
}

impl TryFrom<Interval> for IntervalResult {
    type Error = SdkError;

    fn try_from(i: Interval) -> Result<Self, Self::Error> {
        let confidence_level = ConfidenceLevel::from_percent(i.confidence_level)
            .map_err(|e| SdkError::Decode(e.to_string()))?;

        Ok(IntervalResult {
            confidence_level,
            sample_mean: i.sample_mean,
            margin_of_error: i.margin_of_error,
            lower_bound: i.lower_bound,
            upper_bound: i.upper_bound,
            captures_mean: i.captures_mean,
        })
    }
}

/// Ledger row, keyed by its durable column names
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Record {
    /// Student identifier
    #[serde(rename = "ID_Estudiante")]
    pub student_id: String,
    /// Level label ("95%")
    #[serde(rename = "Nivel_Confianza")]
    pub confidence_level: String,
    /// x̄
    #[serde(rename = "Media_Muestral")]
    pub sample_mean: f64,
    /// Margin of error
    #[serde(rename = "Margen_Error")]
    pub margin_of_error: f64,
    /// Lower bound
    #[serde(rename = "LI")]
    pub lower_bound: f64,
    /// Upper bound
    #[serde(rename = "LS")]
    pub upper_bound: f64,
    /// "SÍ" or "NO"
    #[serde(rename = "Captura_Mu")]
    pub captures_mean: String,
}

impl TryFrom<Record> for LedgerRecord {
    type Error = SdkError;

    fn try_from(r: Record) -> Result<Self, Self::Error> {
        let confidence_level: ConfidenceLevel = r
            .confidence_level
            .parse()
            .map_err(|e: coverlab_domain::IntervalError| SdkError::Decode(e.to_string()))?;
        let capture = Capture::parse(&r.captures_mean).map_err(|e| SdkError::Decode(e.to_string()))?;

        Ok(LedgerRecord {
            student_id: r.student_id,
            confidence_level,
            sample_mean: r.sample_mean,
            margin_of_error: r.margin_of_error,
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            captures_mean: capture.captured(),
        })
    }
}

/// Result of a submission
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOutcome {
    /// Computed interval
    pub result: Interval,
    /// Row the service tried to append
    pub record: Record,
    /// False when the ledger could not be reached
    pub persisted: bool,
    /// Ledger failure reason
    #[serde(default)]
    pub ledger_error: Option<String>,
}

/// Coverage counts for a group of records
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CoverageCounts {
    /// Records counted
    pub total: usize,
    /// Intervals containing μ
    pub captured_count: usize,
    /// Intervals missing μ
    pub missed_count: usize,
    /// Empirical miss rate in percent
    pub error_rate_percent: f64,
    /// Empirical capture rate in percent
    pub coverage_percent: f64,
    /// Nominal miss rate, when the group has a single level
    #[serde(default)]
    pub expected_error_rate_percent: Option<f64>,
}

/// Class-wide summary
#[derive(Debug, Clone, Deserialize)]
pub struct ClassSummary {
    /// Every record
    pub overall: CoverageCounts,
    /// Keyed by level label
    pub by_level: BTreeMap<String, CoverageCounts>,
}

/// Public exercise parameters
#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    /// μ, when the instructor has revealed it
    pub population_mean: Option<f64>,
    /// σ
    pub population_std_dev: f64,
    /// n
    pub sample_size: usize,
    /// Lowest admissible value
    pub min_allowed_value: f64,
    /// Highest admissible value
    pub max_allowed_value: f64,
    /// σ/√n
    pub standard_error: f64,
    /// Selectable levels in percent
    pub confidence_levels: Vec<u32>,
}

impl Parameters {
    /// Parameters for checking a sample the way the service will.
    ///
    /// When μ is hidden the course default stands in for it, so only the
    /// validation limits and the margin of error are meaningful.
    pub fn to_population(&self) -> Result<PopulationParameters, SdkError> {
        PopulationParameters::new(
            self.population_mean.unwrap_or(DEFAULT_POPULATION_MEAN),
            self.population_std_dev,
            self.sample_size,
            self.min_allowed_value,
            self.max_allowed_value,
        )
        .map_err(|e| SdkError::Decode(format!("service parameters are unusable: {}", e)))
    }
}

/// Service health
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    /// "healthy" or "degraded"
    pub status: String,
    /// Visible records, when the ledger could be read
    pub records: Option<usize>,
}

/// Error body returned by the service
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parsing() {
        let json = r#"{
            "ID_Estudiante": "ana",
            "Nivel_Confianza": "99%",
            "Media_Muestral": 100.5,
            "Margen_Error": 1.41,
            "LI": 99.09,
            "LS": 101.91,
            "Captura_Mu": "SÍ"
        }"#;

        let record: Record = serde_json::from_str(json).unwrap();
        let ledger: LedgerRecord = record.try_into().unwrap();
        assert_eq!(ledger.student_id, "ana");
        assert_eq!(ledger.confidence_level, ConfidenceLevel::NinetyNine);
        assert!(ledger.captures_mean);
    }

    #[test]
    fn test_record_with_bad_capture_rejected() {
        let record = Record {
            student_id: "ana".to_string(),
            confidence_level: "95%".to_string(),
            sample_mean: 100.0,
            margin_of_error: 1.0,
            lower_bound: 99.0,
            upper_bound: 101.0,
            captures_mean: "MAYBE".to_string(),
        };
        let result: Result<LedgerRecord, _> = record.try_into();
        assert!(matches!(result, Err(SdkError::Decode(_))));
    }

    #[test]
    fn test_outcome_without_ledger_error() {
        let json = r#"{
            "result": {
                "confidence_level": 95,
                "sample_mean": 100.5,
                "margin_of_error": 1.0735,
                "lower_bound": 99.4265,
                "upper_bound": 101.5735,
                "captures_mean": true
            },
            "record": {
                "ID_Estudiante": "ana",
                "Nivel_Confianza": "95%",
                "Media_Muestral": 100.5,
                "Margen_Error": 1.0735,
                "LI": 99.4265,
                "LS": 101.5735,
                "Captura_Mu": "SÍ"
            },
            "persisted": true
        }"#;

        let outcome: SubmitOutcome = serde_json::from_str(json).unwrap();
        assert!(outcome.persisted);
        assert!(outcome.ledger_error.is_none());
        assert_eq!(outcome.result.confidence_level, 95);
    }

    fn parameters(mean: Option<f64>, sample_size: usize) -> Parameters {
        Parameters {
            population_mean: mean,
            population_std_dev: 2.0,
            sample_size,
            min_allowed_value: 40.0,
            max_allowed_value: 60.0,
            standard_error: 2.0 / (sample_size as f64).sqrt(),
            confidence_levels: vec![90, 95, 99],
        }
    }

    #[test]
    fn test_parameters_to_population() {
        let params = parameters(Some(50.0), 5).to_population().unwrap();
        assert_eq!(params.sample_size(), 5);
        assert_eq!(params.population_mean(), 50.0);
        assert_eq!(params.max_allowed_value(), 60.0);

        let hidden = parameters(None, 5).to_population().unwrap();
        assert_eq!(hidden.population_mean(), DEFAULT_POPULATION_MEAN);
        assert_eq!(hidden.min_allowed_value(), 40.0);
    }

    #[test]
    fn test_unusable_parameters_rejected() {
        assert!(matches!(
            parameters(Some(50.0), 0).to_population(),
            Err(SdkError::Decode(_))
        ));
    }
}
