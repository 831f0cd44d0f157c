use crate::common::error::{Result, StorageError};
use rusqlite::Connection;
use std::env;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Environment variable naming the SQLite database file.
pub const DB_PATH_ENV: &str = "CARBONFLOW_DB_PATH";

const DEFAULT_DB_PATH: &str = "carbonflow.db";

pub struct DatabaseManager {
    conn: Mutex<Connection>,
    path: String,
}

impl DatabaseManager {
    /// Open (or create) the database file configured via `CARBONFLOW_DB_PATH`.
    pub fn new() -> Result<Self> {
        let path = env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

        info!("Opening SQLite database at {}", path);

        let conn = Connection::open(&path).map_err(|e| StorageError::Database {
            message: format!("Failed to open database at {path}: {e}"),
        })?;

        Ok(Self { conn: Mutex::new(conn), path })
    }

    /// In-memory database, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Database {
            message: format!("Failed to open in-memory database: {e}"),
        })?;

        Ok(Self { conn: Mutex::new(conn), path: ":memory:".to_string() })
    }

    /// Run database migrations.
    pub fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../migrations/001_create_emissions.sql");
        self.lock()?
            .execute_batch(migration_sql)
            .map_err(|e| StorageError::Database {
                message: format!("Failed to run migrations: {e}"),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Database {
            message: "Database connection mutex poisoned".to_string(),
        })
    }
}
