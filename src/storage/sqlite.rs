use crate::model::StorageError;
use crate::report::SymbolReport;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Latest persisted report for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    pub symbol: String,
    pub payload: serde_json::Value,
    pub trend_type: String,
    pub analyzed_at: DateTime<Utc>,
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the tables if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS reports (
                symbol TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                trend_type TEXT NOT NULL,
                analyzed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notified (
                signal_key TEXT PRIMARY KEY,
                notified_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::new(":memory:")
    }

    /// Inserts or replaces the latest report of a symbol.
    pub fn save_report(&self, report: &SymbolReport) -> Result<(), StorageError> {
        let payload = serde_json::to_string(report)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO reports (symbol, payload, trend_type, analyzed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &report.symbol,
                &payload,
                report.trend_type().as_str(),
                &Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_report(&self, symbol: &str) -> Result<Option<StoredReport>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT symbol, payload, trend_type, analyzed_at FROM reports WHERE symbol = ?1",
                params![symbol],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((symbol, payload, trend_type, analyzed_at)) = row else {
            return Ok(None);
        };

        Ok(Some(StoredReport {
            symbol,
            payload: serde_json::from_str(&payload)?,
            trend_type,
            analyzed_at: parse_rfc3339(&analyzed_at)?,
        }))
    }

    /// `(symbol, trend_type)` for every stored report, ordered by symbol.
    pub fn list_trends(&self) -> Result<Vec<(String, String)>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT symbol, trend_type FROM reports ORDER BY symbol ASC")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Returns true if the key was never notified or its cooldown has passed.
    pub fn should_notify(&self, signal_key: &str, cooldown: Duration) -> Result<bool, StorageError> {
        self.should_notify_at(signal_key, cooldown, Utc::now())
    }

    fn should_notify_at(&self, signal_key: &str, cooldown: Duration, now: DateTime<Utc>) -> Result<bool, StorageError> {
        let notified_at: Option<String> = self
            .conn
            .query_row(
                "SELECT notified_at FROM notified WHERE signal_key = ?1",
                params![signal_key],
                |row| row.get(0),
            )
            .optional()?;

        match notified_at {
            Some(text) if !text.trim().is_empty() => {
                // datetime('now') format
                let naive = NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S")
                    .map_err(|e| StorageError::InvalidTimestamp(format!("{text}: {e}")))?;
                let notified_at = Utc.from_utc_datetime(&naive);
                Ok(now.signed_duration_since(notified_at) > cooldown)
            }
            _ => Ok(true),
        }
    }

    /// Records that a signal was sent now.
    pub fn mark_notified(&self, signal_key: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO notified (signal_key, notified_at) VALUES (?1, datetime('now'))",
            params![signal_key],
        )?;
        Ok(())
    }
}

fn parse_rfc3339(text: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{text}: {e}")))
}
