//! Read-through cache over the ledger handle
//!
//! The results page is read far more often than it is written. Reads are
//! served from a snapshot for up to `ttl`; an append made through the cache
//! is pushed into the snapshot so the submitter sees their own row at once.

use crate::writer::LedgerHandle;
use coverlab_domain::{LedgerError, LedgerRecord};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Snapshot {
    records: Vec<LedgerRecord>,
    fetched_at: Instant,
}

/// Ledger view with bounded staleness
pub struct CachedLedger {
    handle: LedgerHandle,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl CachedLedger {
    /// Wrap a handle; a zero `ttl` disables caching
    pub fn new(handle: LedgerHandle, ttl: Duration) -> Self {
        Self {
            handle,
            ttl,
            snapshot: Mutex::new(None),
        }
    }

    /// Append through the writer and extend the cached snapshot.
    ///
    /// The snapshot lock is held across the append so cached order matches
    /// the order the writer applied. On failure the snapshot is dropped, since
    /// a timed-out append may still land.
    pub async fn append(&self, record: LedgerRecord) -> Result<(), LedgerError> {
        let mut guard = self.snapshot.lock().await;
        match self.handle.append(record.clone()).await {
            Ok(()) => {
                if let Some(snapshot) = guard.as_mut() {
                    if record.has_student_id() {
                        snapshot.records.push(record);
                    }
                }
                Ok(())
            }
            Err(e) => {
                *guard = None;
                Err(e)
            }
        }
    }

    /// Records in insertion order, at most `ttl` old
    pub async fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut guard = self.snapshot.lock().await;

        if let Some(snapshot) = guard.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                return Ok(snapshot.records.clone());
            }
        }

        let records = self.handle.read_all().await?;
        *guard = Some(Snapshot {
            records: records.clone(),
            fetched_at: Instant::now(),
        });
        Ok(records)
    }

    /// Force the next read to hit the ledger
    pub async fn invalidate(&self) {
        *self.snapshot.lock().await = None;
    }

    /// Configured staleness bound
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LedgerWriter, MemoryLedger};
    use coverlab_domain::{ConfidenceLevel, ResultsLedger};
    use std::sync::{Arc, Mutex as StdMutex};

    fn record(student: &str) -> LedgerRecord {
        LedgerRecord {
            student_id: student.to_string(),
            confidence_level: ConfidenceLevel::NinetyFive,
            sample_mean: 100.0,
            margin_of_error: 1.0,
            lower_bound: 99.0,
            upper_bound: 101.0,
            captures_mean: false,
        }
    }

    /// Memory ledger shared with the test so writes can bypass the cache
    #[derive(Clone, Default)]
    struct SharedLedger(Arc<StdMutex<MemoryLedger>>);

    impl ResultsLedger for SharedLedger {
        fn append_record(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
            self.0.lock().unwrap().append_record(record)
        }

        fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
            self.0.lock().unwrap().read_all()
        }
    }

    #[tokio::test]
    async fn test_own_append_visible_immediately() {
        let handle = LedgerWriter::default().spawn(MemoryLedger::new());
        let cache = CachedLedger::new(handle, Duration::from_secs(3600));

        assert!(cache.read_all().await.unwrap().is_empty());
        cache.append(record("me")).await.unwrap();

        let records = cache.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_id, "me");
    }

    #[tokio::test]
    async fn test_stale_within_ttl_then_refreshed() {
        let shared = SharedLedger::default();
        let handle = LedgerWriter::default().spawn(shared.clone());
        let cache = CachedLedger::new(handle, Duration::from_secs(3600));

        assert!(cache.read_all().await.unwrap().is_empty());

        // Someone else writes straight to the backend
        shared.0.lock().unwrap().append_record(record("other")).unwrap();
        assert!(cache.read_all().await.unwrap().is_empty());

        cache.invalidate().await;
        assert_eq!(cache.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_reads_through() {
        let shared = SharedLedger::default();
        let handle = LedgerWriter::default().spawn(shared.clone());
        let cache = CachedLedger::new(handle, Duration::ZERO);

        assert!(cache.read_all().await.unwrap().is_empty());
        shared.0.lock().unwrap().append_record(record("other")).unwrap();
        assert_eq!(cache.read_all().await.unwrap().len(), 1);
    }
}
