//! Integration tests for coverlab-store
//!
//! These tests exercise the SQLite ledger on disk and through the writer.

use coverlab_domain::{
    process_submission, summarize, ConfidenceLevel, LedgerError, LedgerRecord,
    PopulationParameters, ResultsLedger,
};
use coverlab_store::{CachedLedger, LedgerWriter, SqliteLedger};
use std::time::Duration;
use tempfile::TempDir;

fn record(student: &str, captures_mean: bool) -> LedgerRecord {
    LedgerRecord {
        student_id: student.to_string(),
        confidence_level: ConfidenceLevel::NinetyFive,
        sample_mean: if captures_mean { 100.2 } else { 103.0 },
        margin_of_error: 1.0735,
        lower_bound: 99.1265,
        upper_bound: 101.2735,
        captures_mean,
    }
}

#[test]
fn test_store_initialization() {
    let ledger = SqliteLedger::new(":memory:");
    assert!(ledger.is_ok(), "Ledger should initialize successfully");
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let mut ledger = SqliteLedger::new(&path).unwrap();
        ledger.append_record(record("ana", true)).unwrap();
        ledger.append_record(record("luis", false)).unwrap();
    }

    let ledger = SqliteLedger::new(&path).unwrap();
    let records = ledger.read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].student_id, "ana");
    assert!(records[0].captures_mean);
    assert_eq!(records[1].student_id, "luis");
    assert!(!records[1].captures_mean);
}

#[test]
fn test_round_trip_preserves_values() {
    let params = PopulationParameters::default();
    let submission = process_submission(
        &params,
        "ana",
        "101,99,102,98,100,101,99,100,102,98,100,101,99,100,102,98,100,101,99,100,102,98,100,101,99,100,102,98,100,101",
        ConfidenceLevel::NinetyNine,
    )
    .unwrap();

    let mut ledger = SqliteLedger::in_memory().unwrap();
    ledger.append_record(submission.record.clone()).unwrap();

    let stored = ledger.read_all().unwrap();
    assert_eq!(stored, vec![submission.record]);
}

#[test]
fn test_partial_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let mut ledger = SqliteLedger::new(&path).unwrap();
    ledger.append_record(record("ana", true)).unwrap();
    ledger.append_record(record("   ", true)).unwrap();

    // A row written by another tool with no student id at all
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO ledger_records (\"Nivel_Confianza\", \"Media_Muestral\", \"Margen_Error\", \"LI\", \"LS\", \"Captura_Mu\")
         VALUES ('95%', 100.0, 1.0, 99.0, 101.0, 'SÍ')",
        [],
    )
    .unwrap();

    assert_eq!(ledger.row_count().unwrap(), 3);
    let records = ledger.read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(summarize(&records).total, 1);
}

#[test]
fn test_malformed_row_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let ledger = SqliteLedger::new(&path).unwrap();
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO ledger_records (\"ID_Estudiante\", \"Nivel_Confianza\", \"Media_Muestral\", \"Margen_Error\", \"LI\", \"LS\", \"Captura_Mu\")
         VALUES ('ana', '95%', 100.0, 1.0, 99.0, 101.0, 'TAL VEZ')",
        [],
    )
    .unwrap();

    let err = ledger.read_all().unwrap_err();
    assert!(matches!(err, LedgerError::MalformedRecord(_)));
    assert!(!err.is_transient());
}

#[test]
fn test_text_in_numeric_column_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let ledger = SqliteLedger::new(&path).unwrap();
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO ledger_records (\"ID_Estudiante\", \"Nivel_Confianza\", \"Media_Muestral\", \"Margen_Error\", \"LI\", \"LS\", \"Captura_Mu\")
         VALUES ('ana', '95%', 'abc', 1.0, 99.0, 101.0, 'SÍ')",
        [],
    )
    .unwrap();

    let err = ledger.read_all().unwrap_err();
    match &err {
        LedgerError::MalformedRecord(msg) => assert!(msg.contains("Media_Muestral")),
        other => panic!("Expected MalformedRecord, got {:?}", other),
    }
    assert!(!err.is_transient());
}

#[test]
fn test_unsupported_stored_level_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let ledger = SqliteLedger::new(&path).unwrap();
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO ledger_records (\"ID_Estudiante\", \"Nivel_Confianza\", \"Media_Muestral\", \"Margen_Error\", \"LI\", \"LS\", \"Captura_Mu\")
         VALUES ('ana', '80%', 100.0, 1.0, 99.0, 101.0, 'NO')",
        [],
    )
    .unwrap();

    assert!(matches!(
        ledger.read_all().unwrap_err(),
        LedgerError::MalformedRecord(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_submissions_all_persist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let handle = LedgerWriter::default().spawn(SqliteLedger::new(&path).unwrap());
    let cache = std::sync::Arc::new(CachedLedger::new(handle, Duration::from_secs(60)));

    let mut tasks = Vec::new();
    for i in 0..30 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            cache.append(record(&format!("student-{:02}", i), i % 2 == 0)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    cache.invalidate().await;
    let records = cache.read_all().await.unwrap();
    assert_eq!(records.len(), 30);

    let summary = summarize(&records);
    assert_eq!(summary.captured_count, 15);
    assert_eq!(summary.missed_count, 15);
}
