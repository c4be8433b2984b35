//! Z-interval for the population mean with known σ.
//!
//! The computation is the textbook one:
//!
//! ```text
//! z   = Φ⁻¹(1 - (1 - nc) / 2)
//! ee  = σ / √n
//! me  = z · ee
//! [x̄ - me, x̄ + me]
//! ```
//!
//! For fixed σ, n and level the margin of error is a constant; only the
//! sample mean moves the interval.

use crate::level::ConfidenceLevel;
use crate::params::PopulationParameters;
use std::fmt;

/// Errors from the interval calculator
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalError {
    /// Confidence level outside {90, 95, 99}
    UnsupportedConfidenceLevel(u32),
    /// Confidence level text that is not a percentage at all
    UnrecognizedConfidenceLevel(String),
    /// σ, n or the mean cannot produce an interval
    InvalidParameters(String),
}

impl fmt::Display for IntervalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalError::UnsupportedConfidenceLevel(level) => write!(
                f,
                "unsupported confidence level {}% (supported: 90%, 95%, 99%)",
                level
            ),
            IntervalError::UnrecognizedConfidenceLevel(text) => {
                write!(f, "'{}' is not a confidence level", text)
            }
            IntervalError::InvalidParameters(msg) => write!(f, "invalid parameters: {}", msg),
        }
    }
}

impl std::error::Error for IntervalError {}

/// Outcome of one interval computation. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalResult {
    /// Level the interval was built at
    pub confidence_level: ConfidenceLevel,
    /// Mean of the submitted sample
    pub sample_mean: f64,
    /// Half-width of the interval (≥ 0)
    pub margin_of_error: f64,
    /// sample_mean - margin_of_error
    pub lower_bound: f64,
    /// sample_mean + margin_of_error
    pub upper_bound: f64,
    /// lower_bound ≤ μ ≤ upper_bound
    pub captures_mean: bool,
}

impl IntervalResult {
    /// Full width of the interval
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Check whether a value falls inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }
}

/// Compute the interval from raw numbers.
///
/// This is the general contract used when the caller does not hold a typed
/// [`ConfidenceLevel`]; the level is validated here instead of trusting the
/// input widget.
///
/// # Examples
///
/// ```
/// use coverlab_domain::interval::compute;
///
/// let result = compute(100.5, 95, 3.0, 30, 100.0).unwrap();
/// assert!((result.margin_of_error - 1.0735).abs() < 1e-3);
/// assert!(result.captures_mean);
/// ```
pub fn compute(
    sample_mean: f64,
    confidence_percent: u32,
    population_std_dev: f64,
    sample_size: usize,
    population_mean: f64,
) -> Result<IntervalResult, IntervalError> {
    let level = ConfidenceLevel::from_percent(confidence_percent)?;

    if !sample_mean.is_finite() || !population_mean.is_finite() {
        return Err(IntervalError::InvalidParameters(
            "means must be finite".to_string(),
        ));
    }
    if !population_std_dev.is_finite() || population_std_dev <= 0.0 {
        return Err(IntervalError::InvalidParameters(format!(
            "standard deviation must be > 0, got {}",
            population_std_dev
        )));
    }
    if sample_size == 0 {
        return Err(IntervalError::InvalidParameters(
            "sample size must be at least 1".to_string(),
        ));
    }

    let standard_error = population_std_dev / (sample_size as f64).sqrt();
    Ok(build(sample_mean, level, standard_error, population_mean))
}

/// Compute the interval for a typed level against validated parameters.
///
/// Infallible: [`PopulationParameters`] guarantees σ > 0 and n ≥ 1.
pub fn compute_interval(
    sample_mean: f64,
    level: ConfidenceLevel,
    params: &PopulationParameters,
) -> IntervalResult {
    build(
        sample_mean,
        level,
        params.standard_error(),
        params.population_mean(),
    )
}

/// Margin of error for a level; independent of the sample mean
pub fn margin_of_error(level: ConfidenceLevel, params: &PopulationParameters) -> f64 {
    level.critical_value() * params.standard_error()
}

fn build(
    sample_mean: f64,
    level: ConfidenceLevel,
    standard_error: f64,
    population_mean: f64,
) -> IntervalResult {
    let margin_of_error = level.critical_value() * standard_error;
    let lower_bound = sample_mean - margin_of_error;
    let upper_bound = sample_mean + margin_of_error;

    IntervalResult {
        confidence_level: level,
        sample_mean,
        margin_of_error,
        lower_bound,
        upper_bound,
        captures_mean: lower_bound <= population_mean && population_mean <= upper_bound,
    }
}
