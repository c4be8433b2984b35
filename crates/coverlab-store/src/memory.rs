//! Process-local ledger

use coverlab_domain::{LedgerError, LedgerRecord, ResultsLedger};

/// In-memory ledger living for the lifetime of the process
///
/// Useful for a single-machine class session and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    records: Vec<LedgerRecord>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, including partial ones
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ResultsLedger for MemoryLedger {
    fn append_record(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.records.push(record);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.has_student_id())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverlab_domain::ConfidenceLevel;

    fn record(student: &str) -> LedgerRecord {
        LedgerRecord {
            student_id: student.to_string(),
            confidence_level: ConfidenceLevel::NinetyFive,
            sample_mean: 100.0,
            margin_of_error: 1.0,
            lower_bound: 99.0,
            upper_bound: 101.0,
            captures_mean: true,
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut ledger = MemoryLedger::new();
        for name in ["c", "a", "b"] {
            ledger.append_record(record(name)).unwrap();
        }
        let names: Vec<_> = ledger
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.student_id)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_partial_rows_hidden_but_kept() {
        let mut ledger = MemoryLedger::new();
        ledger.append_record(record("a")).unwrap();
        ledger.append_record(record("")).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }
}
