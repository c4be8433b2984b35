//! Sample validation
//!
//! Turns the raw text a student pastes into a [`Sample`], or explains exactly
//! what to fix. Checks run in a fixed order so each failure is reported
//! distinctly:
//!
//! 1. identifier present
//! 2. at least one token
//! 3. every token parses as a number
//! 4. token count equals the sample size
//! 5. every value lies in the admissible range

use crate::params::PopulationParameters;
use std::fmt;

/// User-correctable reasons a submission is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Student identifier is empty or whitespace-only
    EmptyIdentifier,
    /// No numeric tokens were supplied
    EmptyInput,
    /// A token is not a number
    ParseError {
        /// 1-based position of the token in the input
        position: usize,
        /// The offending token
        token: String,
    },
    /// Wrong number of observations
    WrongCardinality {
        /// Required sample size
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
    /// One or more values outside the admissible range
    OutOfRange {
        /// Every offending value, in input order
        values: Vec<f64>,
        /// Inclusive lower limit
        min: f64,
        /// Inclusive upper limit
        max: f64,
    },
}

impl ValidationError {
    /// Stable machine-readable kind, used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::EmptyIdentifier => "empty_identifier",
            ValidationError::EmptyInput => "empty_input",
            ValidationError::ParseError { .. } => "parse_error",
            ValidationError::WrongCardinality { .. } => "wrong_cardinality",
            ValidationError::OutOfRange { .. } => "out_of_range",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyIdentifier => {
                write!(f, "please enter your name or sample ID")
            }
            ValidationError::EmptyInput => write!(f, "please enter the sample values"),
            ValidationError::ParseError { position, token } => write!(
                f,
                "value #{} ('{}') is not a valid number",
                position, token
            ),
            ValidationError::WrongCardinality { expected, actual } => write!(
                f,
                "expected exactly {} values, but {} were entered",
                expected, actual
            ),
            ValidationError::OutOfRange { values, min, max } => {
                let listed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(
                    f,
                    "{} value(s) outside the allowed range [{}, {}]: {}",
                    values.len(),
                    min,
                    max,
                    listed.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated sample. Created per submission and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    student_id: String,
    values: Vec<f64>,
}

impl Sample {
    /// Student identifier (trimmed, never empty)
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// Observations in submission order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a validated sample
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean of the observations
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

/// Split raw input on commas and whitespace
pub fn tokenize(raw_values: &str) -> Vec<&str> {
    raw_values
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Validate raw input against explicit limits
///
/// # Examples
///
/// ```
/// use coverlab_domain::validation::{validate_sample, ValidationError};
///
/// let err = validate_sample("ana", "1, 2", 3, 0.0, 10.0).unwrap_err();
/// assert_eq!(err, ValidationError::WrongCardinality { expected: 3, actual: 2 });
///
/// let sample = validate_sample("ana", "1, 2 3", 3, 0.0, 10.0).unwrap();
/// assert_eq!(sample.mean(), 2.0);
/// ```
pub fn validate_sample(
    student_id: &str,
    raw_values: &str,
    sample_size: usize,
    min_allowed: f64,
    max_allowed: f64,
) -> Result<Sample, ValidationError> {
    let student_id = student_id.trim();
    if student_id.is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }

    let tokens = tokenize(raw_values);
    if tokens.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let mut values = Vec::with_capacity(tokens.len());
    for (idx, token) in tokens.iter().enumerate() {
        let value: f64 = token.parse().map_err(|_| ValidationError::ParseError {
            position: idx + 1,
            token: token.to_string(),
        })?;
        values.push(value);
    }

    if values.len() != sample_size {
        return Err(ValidationError::WrongCardinality {
            expected: sample_size,
            actual: values.len(),
        });
    }

    // NaN fails both comparisons and is reported as out of range
    let offending: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| !(min_allowed <= *v && *v <= max_allowed))
        .collect();
    if !offending.is_empty() {
        return Err(ValidationError::OutOfRange {
            values: offending,
            min: min_allowed,
            max: max_allowed,
        });
    }

    Ok(Sample {
        student_id: student_id.to_string(),
        values,
    })
}

/// Validate raw input against the session's population parameters
pub fn validate(
    student_id: &str,
    raw_values: &str,
    params: &PopulationParameters,
) -> Result<Sample, ValidationError> {
    validate_sample(
        student_id,
        raw_values,
        params.sample_size(),
        params.min_allowed_value(),
        params.max_allowed_value(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat(value: &str, n: usize) -> String {
        vec![value; n].join(", ")
    }

    #[test]
    fn test_valid_sample() {
        let params = PopulationParameters::default();
        let sample = validate("alice", &repeat("100.5", 30), &params).unwrap();
        assert_eq!(sample.student_id(), "alice");
        assert_eq!(sample.len(), 30);
        assert!((sample.mean() - 100.5).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_separators() {
        let params = PopulationParameters::default();
        let raw = format!("{}\n{} \t{}", repeat("99", 10), repeat("100", 10), repeat("101", 10));
        let sample = validate("bob", &raw, &params).unwrap();
        assert_eq!(sample.len(), 30);
        assert!((sample.mean() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_identifier() {
        let params = PopulationParameters::default();
        assert_eq!(
            validate("   ", &repeat("100", 30), &params),
            Err(ValidationError::EmptyIdentifier)
        );
    }

    #[test]
    fn test_empty_input() {
        let params = PopulationParameters::default();
        assert_eq!(validate("alice", " , ,\n", &params), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_parse_error_before_cardinality() {
        // Only 3 tokens, one malformed: the parse error wins
        let params = PopulationParameters::default();
        let result = validate("alice", "100, abc, 101", &params);
        assert_eq!(
            result,
            Err(ValidationError::ParseError {
                position: 2,
                token: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_wrong_cardinality_29() {
        let params = PopulationParameters::default();
        assert_eq!(
            validate("alice", &repeat("100", 29), &params),
            Err(ValidationError::WrongCardinality {
                expected: 30,
                actual: 29
            })
        );
    }

    #[test]
    fn test_out_of_range_value() {
        let params = PopulationParameters::default();
        let raw = format!("{}, 111.0", repeat("100", 29));
        assert_eq!(
            validate("alice", &raw, &params),
            Err(ValidationError::OutOfRange {
                values: vec![111.0],
                min: 90.0,
                max: 110.0
            })
        );
    }

    #[test]
    fn test_out_of_range_reports_every_value() {
        let params = PopulationParameters::default();
        let raw = format!("89, {}, 111, 200", repeat("100", 27));
        match validate("alice", &raw, &params) {
            Err(ValidationError::OutOfRange { values, .. }) => {
                assert_eq!(values, vec![89.0, 111.0, 200.0]);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let params = PopulationParameters::default();
        let raw = format!("90, 110, {}", repeat("100", 28));
        assert!(validate("alice", &raw, &params).is_ok());

        let below = format!("89, {}", repeat("100", 29));
        assert!(matches!(
            validate("alice", &below, &params),
            Err(ValidationError::OutOfRange { .. })
        ));

        let above = format!("111, {}", repeat("100", 29));
        assert!(matches!(
            validate("alice", &above, &params),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let params = PopulationParameters::default();
        let raw = format!("NaN, {}", repeat("100", 29));
        assert!(matches!(
            validate("alice", &raw, &params),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_error_messages_carry_detail() {
        let msg = ValidationError::WrongCardinality {
            expected: 30,
            actual: 29,
        }
        .to_string();
        assert!(msg.contains("30") && msg.contains("29"));

        let msg = ValidationError::OutOfRange {
            values: vec![111.0],
            min: 90.0,
            max: 110.0,
        }
        .to_string();
        assert!(msg.contains("[90, 110]"));
        assert!(msg.contains("111"));
    }
}
