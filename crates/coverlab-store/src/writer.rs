//! Single-writer ledger actor
//!
//! A classroom submits near-simultaneously. Instead of every request doing
//! its own read-then-write against the store, all commands are queued to one
//! blocking worker that owns the backend and applies them in arrival order.
//! No append can overwrite another.

use coverlab_domain::{LedgerError, LedgerRecord, ResultsLedger};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Default bound on a single ledger call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default command queue depth
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

enum LedgerCommand {
    Append {
        record: LedgerRecord,
        reply: oneshot::Sender<Result<(), LedgerError>>,
    },
    ReadAll {
        reply: oneshot::Sender<Result<Vec<LedgerRecord>, LedgerError>>,
    },
}

/// Spawns the worker that owns a ledger backend
pub struct LedgerWriter {
    timeout: Duration,
    queue_depth: usize,
}

impl LedgerWriter {
    /// Create a writer with the given per-call timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }

    /// Override the command queue depth
    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth.max(1);
        self
    }

    /// Move the backend onto its own blocking thread and return a handle.
    ///
    /// Must be called from within a tokio runtime. The worker stops once every
    /// handle has been dropped.
    pub fn spawn<L>(self, mut ledger: L) -> LedgerHandle
    where
        L: ResultsLedger + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<LedgerCommand>(self.queue_depth);

        tokio::task::spawn_blocking(move || {
            tracing::info!("Ledger writer started");

            while let Some(command) = rx.blocking_recv() {
                match command {
                    LedgerCommand::Append { record, reply } => {
                        let student = record.student_id.clone();
                        let result = ledger.append_record(record);
                        match &result {
                            Ok(()) => tracing::debug!("Appended record for {}", student),
                            Err(e) => tracing::warn!("Append for {} failed: {}", student, e),
                        }
                        // Caller may have timed out; the outcome is already applied
                        let _ = reply.send(result);
                    }
                    LedgerCommand::ReadAll { reply } => {
                        let result = ledger.read_all();
                        if let Err(e) = &result {
                            tracing::warn!("Ledger read failed: {}", e);
                        }
                        let _ = reply.send(result);
                    }
                }
            }

            tracing::info!("Ledger writer stopped");
        });

        LedgerHandle {
            tx,
            timeout: self.timeout,
        }
    }
}

impl Default for LedgerWriter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Cloneable async front to the ledger worker
#[derive(Clone)]
pub struct LedgerHandle {
    tx: mpsc::Sender<LedgerCommand>,
    timeout: Duration,
}

impl LedgerHandle {
    /// Append one record.
    ///
    /// A timeout yields [`LedgerError::Unavailable`]; the queued append may
    /// still be applied afterwards.
    pub async fn append(&self, record: LedgerRecord) -> Result<(), LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LedgerCommand::Append { record, reply }).await?;
        self.await_reply(rx).await
    }

    /// Read every visible record in insertion order
    pub async fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LedgerCommand::ReadAll { reply }).await?;
        self.await_reply(rx).await
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, command: LedgerCommand) -> Result<(), LedgerError> {
        match tokio::time::timeout(self.timeout, self.tx.send(command)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(LedgerError::Unavailable(
                "ledger writer is not running".to_string(),
            )),
            Err(_) => Err(LedgerError::Unavailable(format!(
                "ledger queue full for {:?}",
                self.timeout
            ))),
        }
    }

    async fn await_reply<T>(
        &self,
        rx: oneshot::Receiver<Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(LedgerError::Unavailable(
                "ledger writer stopped before replying".to_string(),
            )),
            Err(_) => Err(LedgerError::Unavailable(format!(
                "ledger did not respond within {:?}",
                self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;
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

    /// Backend whose store is unreachable
    struct DownLedger;

    impl ResultsLedger for DownLedger {
        fn append_record(&mut self, _record: LedgerRecord) -> Result<(), LedgerError> {
            Err(LedgerError::Unavailable("connection refused".to_string()))
        }

        fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
            Err(LedgerError::Unavailable("connection refused".to_string()))
        }
    }

    /// Backend that blocks longer than any reasonable timeout
    struct SlowLedger(Duration);

    impl ResultsLedger for SlowLedger {
        fn append_record(&mut self, _record: LedgerRecord) -> Result<(), LedgerError> {
            std::thread::sleep(self.0);
            Ok(())
        }

        fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
            std::thread::sleep(self.0);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_append_then_read() {
        let handle = LedgerWriter::default().spawn(MemoryLedger::new());
        handle.append(record("a")).await.unwrap();
        handle.append(record("b")).await.unwrap();

        let records = handle.read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].student_id, "a");
        assert_eq!(records[1].student_id, "b");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let handle = LedgerWriter::default().spawn(MemoryLedger::new());

        let mut tasks = Vec::new();
        for i in 0..50 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.append(record(&format!("student-{}", i))).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(handle.read_all().await.unwrap().len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queue_depth_of_one_still_serves_everyone() {
        let handle = LedgerWriter::new(Duration::from_secs(2))
            .with_queue_depth(0)
            .spawn(MemoryLedger::new());
        assert_eq!(handle.timeout(), Duration::from_secs(2));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.append(record(&format!("student-{}", i))).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(handle.read_all().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_backend_unavailable_is_surfaced() {
        let handle = LedgerWriter::default().spawn(DownLedger);
        let err = handle.append(record("a")).await.unwrap_err();
        assert!(err.is_transient());
        assert!(handle.read_all().await.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let handle = LedgerWriter::new(Duration::from_millis(20))
            .spawn(SlowLedger(Duration::from_millis(300)));

        let err = handle.read_all().await.unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));
    }
}
