//! SQLite-backed record store for accounts and demands.
//!
//! The database lives at `~/.demandtrack/demandtrack.db` by default. All
//! reads and writes go through [`Db`]; callers that need atomicity across
//! multiple statements use [`Db::with_transaction`].

use std::path::PathBuf;

use rusqlite::Connection;
use thiserror::Error;

mod accounts;
mod demands;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

pub struct Db {
    conn: Connection,
}

impl Db {
    /// Open (or create) a database at an explicit path and apply the schema.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL for better concurrent read behavior
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.demandtrack/demandtrack.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".demandtrack").join("demandtrack.db"))
    }

    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, crate::error::AppError>
    where
        F: FnOnce(&Self) -> Result<T, crate::error::AppError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DbError::from)?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT").map_err(DbError::from)?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}
