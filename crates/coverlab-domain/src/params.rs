//! Population parameters fixed for the lifetime of a class session.

use std::fmt;

/// Population mean used by the course exercise
pub const DEFAULT_POPULATION_MEAN: f64 = 100.0;

/// Known population standard deviation used by the course exercise
pub const DEFAULT_POPULATION_STD_DEV: f64 = 3.0;

/// Observations required per submission
pub const DEFAULT_SAMPLE_SIZE: usize = 30;

/// Smallest admissible observation
pub const DEFAULT_MIN_ALLOWED_VALUE: f64 = 90.0;

/// Largest admissible observation
pub const DEFAULT_MAX_ALLOWED_VALUE: f64 = 110.0;

/// Errors raised when population parameters are inconsistent
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter is NaN or infinite
    NonFinite(&'static str),
    /// Standard deviation must be strictly positive
    NonPositiveStdDev(f64),
    /// Sample size must be at least one
    ZeroSampleSize,
    /// The admissible range is empty
    InvertedRange {
        /// Lower end of the range
        min: f64,
        /// Upper end of the range
        max: f64,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::NonFinite(name) => write!(f, "{} must be a finite number", name),
            ParameterError::NonPositiveStdDev(sd) => {
                write!(f, "population standard deviation must be > 0, got {}", sd)
            }
            ParameterError::ZeroSampleSize => write!(f, "sample size must be at least 1"),
            ParameterError::InvertedRange { min, max } => {
                write!(f, "minimum allowed value {} exceeds maximum {}", min, max)
            }
        }
    }
}

impl std::error::Error for ParameterError {}

/// Process-wide constants of the exercise.
///
/// Constructed once at startup and handed to every component by reference.
/// Fields are private so a constructed value is always consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationParameters {
    population_mean: f64,
    population_std_dev: f64,
    sample_size: usize,
    min_allowed_value: f64,
    max_allowed_value: f64,
}

impl PopulationParameters {
    /// Create a validated parameter set
    ///
    /// # Examples
    ///
    /// ```
    /// use coverlab_domain::PopulationParameters;
    ///
    /// let params = PopulationParameters::new(50.0, 2.0, 25, 40.0, 60.0).unwrap();
    /// assert_eq!(params.sample_size(), 25);
    /// assert!((params.standard_error() - 0.4).abs() < 1e-12);
    /// ```
    pub fn new(
        population_mean: f64,
        population_std_dev: f64,
        sample_size: usize,
        min_allowed_value: f64,
        max_allowed_value: f64,
    ) -> Result<Self, ParameterError> {
        let finite_checks = [
            ("population mean", population_mean),
            ("population standard deviation", population_std_dev),
            ("minimum allowed value", min_allowed_value),
            ("maximum allowed value", max_allowed_value),
        ];
        for (name, value) in finite_checks {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite(name));
            }
        }
        if population_std_dev <= 0.0 {
            return Err(ParameterError::NonPositiveStdDev(population_std_dev));
        }
        if sample_size == 0 {
            return Err(ParameterError::ZeroSampleSize);
        }
        if min_allowed_value > max_allowed_value {
            return Err(ParameterError::InvertedRange {
                min: min_allowed_value,
                max: max_allowed_value,
            });
        }

        Ok(Self {
            population_mean,
            population_std_dev,
            sample_size,
            min_allowed_value,
            max_allowed_value,
        })
    }

    /// The true (secret) population mean
    pub fn population_mean(&self) -> f64 {
        self.population_mean
    }

    /// The known population standard deviation
    pub fn population_std_dev(&self) -> f64 {
        self.population_std_dev
    }

    /// Required number of observations per sample
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Smallest admissible observation (inclusive)
    pub fn min_allowed_value(&self) -> f64 {
        self.min_allowed_value
    }

    /// Largest admissible observation (inclusive)
    pub fn max_allowed_value(&self) -> f64 {
        self.max_allowed_value
    }

    /// Standard error of the mean: σ / √n
    pub fn standard_error(&self) -> f64 {
        self.population_std_dev / (self.sample_size as f64).sqrt()
    }
}

impl Default for PopulationParameters {
    fn default() -> Self {
        Self {
            population_mean: DEFAULT_POPULATION_MEAN,
            population_std_dev: DEFAULT_POPULATION_STD_DEV,
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_allowed_value: DEFAULT_MIN_ALLOWED_VALUE,
            max_allowed_value: DEFAULT_MAX_ALLOWED_VALUE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_exercise() {
        let params = PopulationParameters::default();
        assert_eq!(params.population_mean(), 100.0);
        assert_eq!(params.population_std_dev(), 3.0);
        assert_eq!(params.sample_size(), 30);
        assert_eq!(params.min_allowed_value(), 90.0);
        assert_eq!(params.max_allowed_value(), 110.0);
    }

    #[test]
    fn test_standard_error() {
        let params = PopulationParameters::default();
        // 3 / sqrt(30) = 0.5477...
        assert!((params.standard_error() - 0.547722557505).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_std_dev() {
        let result = PopulationParameters::new(100.0, 0.0, 30, 90.0, 110.0);
        assert_eq!(result, Err(ParameterError::NonPositiveStdDev(0.0)));
    }

    #[test]
    fn test_rejects_zero_sample_size() {
        let result = PopulationParameters::new(100.0, 3.0, 0, 90.0, 110.0);
        assert_eq!(result, Err(ParameterError::ZeroSampleSize));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result = PopulationParameters::new(100.0, 3.0, 30, 110.0, 90.0);
        assert!(matches!(result, Err(ParameterError::InvertedRange { .. })));
    }

    #[test]
    fn test_rejects_nan() {
        let result = PopulationParameters::new(f64::NAN, 3.0, 30, 90.0, 110.0);
        assert_eq!(result, Err(ParameterError::NonFinite("population mean")));
    }
}
