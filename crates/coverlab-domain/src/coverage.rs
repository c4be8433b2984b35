//! Coverage aggregation over the ledger
//!
//! Summaries are recomputed from scratch on every read; the ledger is the
//! single source of truth and nothing here keeps incremental state.

use crate::level::ConfidenceLevel;
use crate::record::LedgerRecord;
use std::collections::BTreeMap;

/// How many submitted intervals captured μ
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoverageSummary {
    /// Records counted
    pub total: usize,
    /// Records whose interval contains μ
    pub captured_count: usize,
    /// total - captured_count
    pub missed_count: usize,
    /// 100 · missed / total, or 0 when there are no records
    pub error_rate_percent: f64,
}

impl CoverageSummary {
    /// Empirical capture rate in percent (0 when empty)
    pub fn coverage_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 - self.error_rate_percent
        }
    }

    /// True when no records have been counted yet
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Nominal error rate a class should approach at this level
    pub fn expected_error_rate_percent(level: ConfidenceLevel) -> f64 {
        level.alpha_percent()
    }
}

/// Summarize every well-formed record
///
/// # Examples
///
/// ```
/// use coverlab_domain::{summarize, ConfidenceLevel, LedgerRecord};
///
/// let row = |captured| LedgerRecord {
///     student_id: "s".into(),
///     confidence_level: ConfidenceLevel::NinetyFive,
///     sample_mean: 100.0,
///     margin_of_error: 1.0,
///     lower_bound: 99.0,
///     upper_bound: 101.0,
///     captures_mean: captured,
/// };
/// let summary = summarize(&[row(true), row(false), row(true)]);
/// assert_eq!(summary.captured_count, 2);
/// assert_eq!(summary.missed_count, 1);
/// ```
pub fn summarize(records: &[LedgerRecord]) -> CoverageSummary {
    tally(records.iter().filter(|r| r.has_student_id()))
}

/// Summaries split by confidence level.
///
/// A class may mix levels; each level's miss rate should be compared with
/// its own α. Levels with no records are absent from the map.
pub fn summarize_by_level(records: &[LedgerRecord]) -> BTreeMap<ConfidenceLevel, CoverageSummary> {
    ConfidenceLevel::ALL
        .iter()
        .filter_map(|level| {
            let summary = tally(
                records
                    .iter()
                    .filter(|r| r.has_student_id() && r.confidence_level == *level),
            );
            (!summary.is_empty()).then_some((*level, summary))
        })
        .collect()
}

fn tally<'a>(records: impl Iterator<Item = &'a LedgerRecord>) -> CoverageSummary {
    let (total, captured_count) = records.fold((0usize, 0usize), |(total, captured), r| {
        (total + 1, captured + usize::from(r.captures_mean))
    });
    let missed_count = total - captured_count;
    let error_rate_percent = if total == 0 {
        0.0
    } else {
        100.0 * missed_count as f64 / total as f64
    };

    CoverageSummary {
        total,
        captured_count,
        missed_count,
        error_rate_percent,
    }
}
