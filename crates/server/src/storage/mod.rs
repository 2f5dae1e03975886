mod bundles;
mod cards;
mod groups;
mod members;
mod ownership;
mod tokens;
mod users;

use anyhow::{Context, Result};
use rusqlite::{types::Value as SqlValue, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use flashqudo_api::db::{migrations::MIGRATIONS, Built};

/// Storage-layer failure. Callers decide whether a variant means deny,
/// a client error, or a 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("referenced row does not exist")]
    DanglingReference,

    #[error("group still has other members")]
    MembersExist,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Map constraint violations on a write to `Conflict` / `DanglingReference`.
    fn on_write(entity: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |e| match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Self::DanglingReference
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(entity)
            }
            _ => Self::Sqlite(e),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reject empty ids before they reach SQL.
fn require(name: &'static str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::MissingParameter(name));
    }
    Ok(())
}

/// Shared database state
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Open (or create) the database file at `path` and apply migrations.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir for {}", path.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening SQLite database {}", path.display()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Initialize the database under the data directory.
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)?;
    Db::open_path(&data_dir.join("flashqudo.db"))
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

// ── sea-query → rusqlite glue ──────────────────────────────────────────────

/// Convert `sea_query::Values` into rusqlite bind parameters.
fn bind_values(values: &sea_query::Values) -> Vec<SqlValue> {
    values
        .0
        .iter()
        .map(|v| match v {
            sea_query::Value::String(Some(s)) => SqlValue::Text(s.to_string()),
            sea_query::Value::Bool(Some(b)) => SqlValue::Integer(i64::from(*b)),
            sea_query::Value::Int(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::BigInt(Some(i)) => SqlValue::Integer(*i),
            sea_query::Value::Unsigned(Some(u)) => SqlValue::Integer(i64::from(*u)),
            sea_query::Value::BigUnsigned(Some(u)) => {
                SqlValue::Integer(i64::try_from(*u).unwrap_or(i64::MAX))
            }
            _ => SqlValue::Null,
        })
        .collect()
}

fn execute(conn: &Connection, (sql, values): &Built) -> rusqlite::Result<usize> {
    conn.execute(sql, rusqlite::params_from_iter(bind_values(values)))
}

fn query_opt<T>(
    conn: &Connection,
    (sql, values): &Built,
    map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
    conn.query_row(sql, rusqlite::params_from_iter(bind_values(values)), map)
        .optional()
}

fn query_one<T>(
    conn: &Connection,
    (sql, values): &Built,
    map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<T> {
    conn.query_row(sql, rusqlite::params_from_iter(bind_values(values)), map)
}

fn query_all<T>(
    conn: &Connection,
    (sql, values): &Built,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bind_values(values)), map)?;
    rows.collect()
}
