//! SQLite-backed ledger

use crate::StoreError;
use coverlab_domain::record::{Capture, COLUMNS};
use coverlab_domain::{ConfidenceLevel, LedgerError, LedgerRecord, ResultsLedger};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite implementation of [`ResultsLedger`]
///
/// Rows are inserted with an autoincrement sequence number that fixes their
/// order; triggers in the schema abort any UPDATE or DELETE.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a ledger between tasks by
/// handing it to [`crate::LedgerWriter`], which owns it on a single thread.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (or create) a ledger at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use coverlab_store::SqliteLedger;
    ///
    /// let ledger = SqliteLedger::new("coverlab.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let ledger = Self { conn };
        ledger.initialize_schema()?;
        Ok(ledger)
    }

    /// Open a fresh in-memory ledger
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn insert(&self, record: &LedgerRecord) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO ledger_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            quoted_columns()
        );
        self.conn.execute(
            &sql,
            params![
                &record.student_id,
                record.confidence_level.label(),
                record.sample_mean,
                record.margin_of_error,
                record.lower_bound,
                record.upper_bound,
                record.capture().as_str(),
            ],
        )?;
        Ok(())
    }

    fn select_all(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM ledger_records
             WHERE \"ID_Estudiante\" IS NOT NULL AND trim(\"ID_Estudiante\") <> ''
             ORDER BY seq",
            quoted_columns()
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    student_id: row.get(0)?,
                    level: row.get(1)?,
                    sample_mean: row.get(2)?,
                    margin_of_error: row.get(3)?,
                    lower_bound: row.get(4)?,
                    upper_bound: row.get(5)?,
                    capture: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(row_error)?;

        rows.into_iter().map(RawRow::into_record).collect()
    }

    /// Number of stored rows, including partial ones
    pub fn row_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ledger_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Column values of the wrong type are a schema problem, not an outage
fn row_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::InvalidColumnType(_, name, found) => {
            StoreError::InvalidData(format!("column {} holds {} where a number was expected", name, found))
        }
        rusqlite::Error::FromSqlConversionFailure(index, found, source) => {
            let name = COLUMNS.get(index).copied().unwrap_or("?");
            StoreError::InvalidData(format!("column {} holds unreadable {}: {}", name, found, source))
        }
        rusqlite::Error::IntegralValueOutOfRange(index, value) => {
            let name = COLUMNS.get(index).copied().unwrap_or("?");
            StoreError::InvalidData(format!("column {} value {} is out of range", name, value))
        }
        other => StoreError::Database(other),
    }
}

/// Column list as it appears in SQL
fn quoted_columns() -> String {
    COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Row as stored, before schema checks
struct RawRow {
    student_id: String,
    level: String,
    sample_mean: f64,
    margin_of_error: f64,
    lower_bound: f64,
    upper_bound: f64,
    capture: String,
}

impl RawRow {
    fn into_record(self) -> Result<LedgerRecord, StoreError> {
        let confidence_level: ConfidenceLevel = self.level.parse().map_err(|_| {
            StoreError::InvalidData(format!(
                "{} '{}' is not a supported level",
                COLUMNS[1], self.level
            ))
        })?;
        let capture = Capture::parse(&self.capture)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        Ok(LedgerRecord {
            student_id: self.student_id,
            confidence_level,
            sample_mean: self.sample_mean,
            margin_of_error: self.margin_of_error,
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            captures_mean: capture.captured(),
        })
    }
}

impl ResultsLedger for SqliteLedger {
    fn append_record(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.insert(&record).map_err(LedgerError::from)
    }

    fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.select_all().map_err(LedgerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_columns() {
        let cols = quoted_columns();
        assert!(cols.starts_with("\"ID_Estudiante\""));
        assert!(cols.ends_with("\"Captura_Mu\""));
    }

    #[test]
    fn test_capture_stored_as_si_no() {
        let mut ledger = SqliteLedger::in_memory().unwrap();
        let record = LedgerRecord {
            student_id: "ana".to_string(),
            confidence_level: ConfidenceLevel::NinetyFive,
            sample_mean: 100.0,
            margin_of_error: 1.07,
            lower_bound: 98.93,
            upper_bound: 101.07,
            captures_mean: true,
        };
        ledger.append_record(record).unwrap();

        let (level, capture): (String, String) = ledger
            .conn
            .query_row(
                "SELECT \"Nivel_Confianza\", \"Captura_Mu\" FROM ledger_records",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(level, "95%");
        assert_eq!(capture, "SÍ");
    }

    #[test]
    fn test_update_and_delete_are_rejected() {
        let mut ledger = SqliteLedger::in_memory().unwrap();
        ledger
            .append_record(LedgerRecord {
                student_id: "ana".to_string(),
                confidence_level: ConfidenceLevel::Ninety,
                sample_mean: 100.0,
                margin_of_error: 0.9,
                lower_bound: 99.1,
                upper_bound: 100.9,
                captures_mean: true,
            })
            .unwrap();

        assert!(ledger
            .conn
            .execute("UPDATE ledger_records SET \"LI\" = 0", [])
            .is_err());
        assert!(ledger.conn.execute("DELETE FROM ledger_records", []).is_err());
        assert_eq!(ledger.row_count().unwrap(), 1);
    }
}
