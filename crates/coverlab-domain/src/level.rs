//! Supported confidence levels

use crate::interval::IntervalError;
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use std::str::FromStr;

/// Two-sided confidence level offered to students
///
/// Only the levels taught in the exercise are representable. Anything else
/// is rejected with [`IntervalError::UnsupportedConfidenceLevel`] rather than
/// computing a quantile nobody asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConfidenceLevel {
    /// 90% confidence
    Ninety,
    /// 95% confidence
    #[default]
    NinetyFive,
    /// 99% confidence
    NinetyNine,
}

impl ConfidenceLevel {
    /// All supported levels, narrowest interval first
    pub const ALL: [ConfidenceLevel; 3] = [
        ConfidenceLevel::Ninety,
        ConfidenceLevel::NinetyFive,
        ConfidenceLevel::NinetyNine,
    ];

    /// Map an integer percent onto a supported level
    ///
    /// # Examples
    ///
    /// ```
    /// use coverlab_domain::{ConfidenceLevel, IntervalError};
    ///
    /// assert_eq!(ConfidenceLevel::from_percent(99), Ok(ConfidenceLevel::NinetyNine));
    /// assert_eq!(
    ///     ConfidenceLevel::from_percent(80),
    ///     Err(IntervalError::UnsupportedConfidenceLevel(80))
    /// );
    /// ```
    pub fn from_percent(percent: u32) -> Result<Self, IntervalError> {
        match percent {
            90 => Ok(ConfidenceLevel::Ninety),
            95 => Ok(ConfidenceLevel::NinetyFive),
            99 => Ok(ConfidenceLevel::NinetyNine),
            other => Err(IntervalError::UnsupportedConfidenceLevel(other)),
        }
    }

    /// Integer percent (90, 95 or 99)
    pub fn percent(&self) -> u32 {
        match self {
            ConfidenceLevel::Ninety => 90,
            ConfidenceLevel::NinetyFive => 95,
            ConfidenceLevel::NinetyNine => 99,
        }
    }

    /// Level as a proportion (0.95 for 95%)
    pub fn proportion(&self) -> f64 {
        f64::from(self.percent()) / 100.0
    }

    /// Nominal long-run percentage of intervals that miss the mean (α × 100)
    pub fn alpha_percent(&self) -> f64 {
        100.0 - f64::from(self.percent())
    }

    /// Label used in the persisted ledger ("95%")
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::Ninety => "90%",
            ConfidenceLevel::NinetyFive => "95%",
            ConfidenceLevel::NinetyNine => "99%",
        }
    }

    /// Cumulative probability whose standard-normal quantile is the critical value
    pub fn cumulative_probability(&self) -> f64 {
        1.0 - (1.0 - self.proportion()) / 2.0
    }

    /// Two-sided critical value z such that Φ(z) = 1 - (1 - nc) / 2
    pub fn critical_value(&self) -> f64 {
        standard_normal_quantile(self.cumulative_probability())
    }
}

/// Inverse CDF of the standard normal distribution.
///
/// Callers must pass `p` in `[0, 1]`; the supported levels only ever ask for
/// 0.95, 0.975 and 0.995.
pub(crate) fn standard_normal_quantile(p: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = IntervalError;

    /// Accepts "95" as well as the persisted "95%" form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let percent: u32 = digits
            .parse()
            .map_err(|_| IntervalError::UnrecognizedConfidenceLevel(s.to_string()))?;
        Self::from_percent(percent)
    }
}
