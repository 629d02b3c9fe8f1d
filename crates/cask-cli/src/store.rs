//! SQLite install store
//!
//! Remembers which casks are installed, at which version and from which
//! artifact.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cask_core::StoreError;
use cask_core::db_path;
use cask_core::host::{InstallRecord, InstallStore};
use cask_core::types::{PackageName, Version};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::new(err)
    }
}

/// [`InstallStore`] backed by `~/.cask/state.db`.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the state database
    pub fn open() -> Result<Self, DbError> {
        let path = db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_at(&path)
    }

    /// Open database at a specific path (for testing)
    pub fn open_at(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS casks (
                name TEXT PRIMARY KEY,
                version TEXT NOT NULL,
                arch TEXT NOT NULL,
                sha256 TEXT NOT NULL,
                installed_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn record(row: &Row<'_>) -> rusqlite::Result<InstallRecord> {
    Ok(InstallRecord {
        name: PackageName::from(row.get::<_, String>(0)?),
        version: Version::from(row.get::<_, String>(1)?),
        arch: row.get(2)?,
        sha256: row.get(3)?,
        installed_at: row.get(4)?,
    })
}

impl InstallStore for SqliteStore {
    fn get(&self, name: &PackageName) -> Result<Option<InstallRecord>, StoreError> {
        self.conn()
            .query_row(
                "SELECT name, version, arch, sha256, installed_at FROM casks WHERE name = ?1",
                params![name.as_str()],
                record,
            )
            .optional()
            .map_err(|e| DbError::from(e).into())
    }

    fn put(&self, rec: &InstallRecord) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO casks (name, version, arch, sha256, installed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    rec.name.as_str(),
                    rec.version.as_str(),
                    rec.arch,
                    rec.sha256,
                    rec.installed_at
                ],
            )
            .map_err(DbError::from)?;
        Ok(())
    }

    fn remove(&self, name: &PackageName) -> Result<(), StoreError> {
        self.conn()
            .execute("DELETE FROM casks WHERE name = ?1", params![name.as_str()])
            .map_err(DbError::from)?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<InstallRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT name, version, arch, sha256, installed_at FROM casks ORDER BY name")
            .map_err(DbError::from)?;
        let rows = stmt.query_map([], record).map_err(DbError::from)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::from(e).into())
    }
}
