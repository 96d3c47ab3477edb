use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::db::{RunStatus, ValidationRunRecord};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for history database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed validation history.
///
/// A thin wrapper around `rusqlite::Connection` that opens/creates the file,
/// applies migrations, and stores/lists validation runs.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open (or create) a history database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> DbResult<i32> {
        current_schema_version(&self.conn)
    }

    /// Insert a validation run and return its row id.
    pub fn insert_run(&self, record: &ValidationRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO validation_runs (chain, chain_hash, candidate_hash, entry, statements, matches, false_live, false_dead, precision, recall, f1_score, status, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.chain,
                record.chain_hash,
                record.candidate_hash,
                record.entry,
                record.statements as i64,
                record.matches as i64,
                record.false_live as i64,
                record.false_dead as i64,
                record.precision,
                record.recall,
                record.f1_score,
                record.status.as_str(),
                record.recorded_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List runs (ordered by id), optionally filtered by chain name.
    pub fn list_runs(&self, chain: Option<&str>) -> DbResult<Vec<ValidationRunRecord>> {
        fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<ValidationRunRecord> {
            let status: String = row.get(11)?;
            Ok(ValidationRunRecord {
                chain: row.get(0)?,
                chain_hash: row.get(1)?,
                candidate_hash: row.get(2)?,
                entry: row.get(3)?,
                statements: row.get::<_, i64>(4)? as usize,
                matches: row.get::<_, i64>(5)? as usize,
                false_live: row.get::<_, i64>(6)? as usize,
                false_dead: row.get::<_, i64>(7)? as usize,
                precision: row.get(8)?,
                recall: row.get(9)?,
                f1_score: row.get(10)?,
                status: RunStatus::parse(&status).ok_or(rusqlite::Error::InvalidQuery)?,
                recorded_at: row.get(12)?,
            })
        }

        let select = r#"
            SELECT chain, chain_hash, candidate_hash, entry, statements, matches, false_live, false_dead, precision, recall, f1_score, status, recorded_at
            FROM validation_runs
        "#;

        let mut out = Vec::new();
        match chain {
            Some(chain) => {
                let mut stmt =
                    self.conn.prepare(&format!("{select} WHERE chain = ?1 ORDER BY id"))?;
                for row in stmt.query_map(params![chain], map_run)? {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{select} ORDER BY id"))?;
                for row in stmt.query_map([], map_run)? {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    /// Most recent run for a chain, if any.
    pub fn latest_run(&self, chain: &str) -> DbResult<Option<ValidationRunRecord>> {
        Ok(self.list_runs(Some(chain))?.pop())
    }
}

/// Apply schema migrations up to `CURRENT_SCHEMA_VERSION`.
///
/// We use `PRAGMA user_version` as the schema version indicator.
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS validation_runs (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                chain          TEXT NOT NULL,
                chain_hash     TEXT NOT NULL,
                candidate_hash TEXT NOT NULL,
                entry          TEXT NOT NULL,
                statements     INTEGER NOT NULL,
                matches        INTEGER NOT NULL,
                false_live     INTEGER NOT NULL,
                false_dead     INTEGER NOT NULL,
                precision      REAL NOT NULL,
                recall         REAL NOT NULL,
                f1_score       REAL NOT NULL,
                status         TEXT NOT NULL,
                recorded_at    TEXT NOT NULL
            );
            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE INDEX IF NOT EXISTS idx_validation_runs_chain ON validation_runs (chain);
            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
