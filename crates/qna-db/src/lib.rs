pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

pub use error::{DbError, DbResult};

use anyhow::{Context, Result};
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

const MEMORY_URI: &str = ":memory:";
const SQLITE_SCHEME: &str = "sqlite://";

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    Memory,
    File(PathBuf),
}

impl DbTarget {
    /// Accepts a bare path, `:memory:`, or a SQLAlchemy-style SQLite URL:
    /// `sqlite://` (in memory), `sqlite:///relative.db`, `sqlite:////abs/path.db`.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            anyhow::bail!("empty database connection string");
        }

        let Some(rest) = uri.strip_prefix(SQLITE_SCHEME) else {
            if uri.contains("://") {
                anyhow::bail!("unsupported database URL '{uri}': only {SQLITE_SCHEME} is supported");
            }
            return Ok(Self::from_path(uri));
        };

        if rest.is_empty() || rest == MEMORY_URI {
            return Ok(Self::Memory);
        }
        // The third slash separates the (empty) host from the path.
        let Some(path) = rest.strip_prefix('/') else {
            anyhow::bail!("invalid SQLite URL '{uri}': expected {SQLITE_SCHEME}/<path>");
        };
        if path.is_empty() {
            return Ok(Self::Memory);
        }
        Ok(Self::from_path(path))
    }

    fn from_path(path: &str) -> Self {
        if path == MEMORY_URI {
            Self::Memory
        } else {
            Self::File(PathBuf::from(path))
        }
    }
}

/// The persistence gateway. Every public query runs in its own short
/// transaction on the single guarded connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open from a connection string; see [`DbTarget::parse`].
    pub fn connect(uri: &str) -> Result<Self> {
        match DbTarget::parse(uri)? {
            DbTarget::Memory => Self::open_in_memory(),
            DbTarget::File(path) => Self::open(&path),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self::init(Connection::open_in_memory()?)?;
        info!("In-memory database opened");
        Ok(db)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Cascades on Answer depend on this; SQLite leaves it off by default.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` in a deferred transaction. Used for reads.
    pub fn with_tx<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        self.transact(TransactionBehavior::Deferred, f)
    }

    /// Run `f` in an immediate transaction, taking the write lock up front so
    /// a check made inside `f` still holds when `f` writes.
    pub fn with_tx_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        self.transact(TransactionBehavior::Immediate, f)
    }

    fn transact<F, T>(&self, behavior: TransactionBehavior, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        let tx = conn.transaction_with_behavior(behavior)?;

        // Dropping `tx` on the error path rolls back.
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
