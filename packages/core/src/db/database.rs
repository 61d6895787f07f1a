//! Database Connection Management
//!
//! Opens the embedded libsql database, applies the connection PRAGMAs and
//! provides the write-transaction helpers every tree mutation goes through.
//! Table creation for the configured page and slug tables lives in
//! [`PageStore`](crate::db::PageStore).
//!
//! # Database Connection Patterns
//!
//! **Use `connect_with_timeout()` in async functions.** It sets a 5-second
//! busy timeout and enables foreign keys on the new connection; both are
//! per-connection settings in SQLite.
//!
//! Mutations run as:
//!
//! ```no_run
//! # use pagetree_core::db::{DatabaseError, DatabaseService};
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), DatabaseError> {
//! # let db = DatabaseService::new(PathBuf::from("./data/pages.db")).await?;
//! let conn = db.connect_with_timeout().await?;
//! db.begin_immediate(&conn).await?;
//! let result: Result<(), DatabaseError> = async {
//!     // reads and writes on `conn`
//!     Ok(())
//! }
//! .await;
//! db.finish(&conn, result).await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::{Builder, Connection, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Busy timeout applied to every connection, in milliseconds
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Database service for managing the libsql connection
///
/// # Examples
///
/// ```no_run
/// use pagetree_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("/path/to/pages.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,

    /// Whether the file did not exist before this service opened it
    is_new_database: bool,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Enable WAL mode
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - A PRAGMA fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
            is_new_database,
        };

        let conn = service.connect_with_timeout().await?;
        service
            .execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        tracing::debug!(path = %service.db_path.display(), is_new_database, "Opened page database");
        Ok(service)
    }

    /// Whether this service created the database file
    pub fn is_new_database(&self) -> bool {
        self.is_new_database
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() rather than
    /// execute().
    pub async fn execute_pragma(&self, conn: &Connection, pragma: &str) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Get a connection without the per-connection PRAGMAs
    ///
    /// Only for synchronous, single-threaded code that does not need foreign
    /// keys. Everything else should use `connect_with_timeout()`.
    pub fn connect(&self) -> Result<Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with busy timeout and foreign keys enabled
    pub async fn connect_with_timeout(&self) -> Result<Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, &format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
            .await?;
        // ON DELETE CASCADE from pages to slugs depends on this
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        Ok(conn)
    }

    /// Start a write transaction, taking the database write lock up front
    ///
    /// Every bound that a mutation reads after this point stays valid until
    /// the transaction ends.
    pub async fn begin_immediate(&self, conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute("BEGIN IMMEDIATE", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
        })?;
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`, and hand the result through
    pub async fn finish<T, E>(&self, conn: &Connection, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError> + std::fmt::Display,
    {
        match result {
            Ok(value) => {
                if let Err(e) = conn.execute("COMMIT", ()).await {
                    let _rollback = conn.execute("ROLLBACK", ()).await;
                    tracing::warn!(error = %e, "Commit failed, transaction rolled back");
                    return Err(DatabaseError::sql_execution(format!(
                        "Failed to commit transaction: {}",
                        e
                    ))
                    .into());
                }
                Ok(value)
            }
            Err(err) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                tracing::warn!(error = %err, "Transaction rolled back");
                Err(err)
            }
        }
    }

    /// Start a read transaction
    ///
    /// The snapshot is taken at the first read and every later statement on
    /// `conn` sees it until `finish_read`, so a multi-statement read cannot
    /// mix bounds from before and after a concurrent move.
    pub async fn begin_read(&self, conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute("BEGIN DEFERRED", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin read transaction: {}", e))
        })?;
        Ok(())
    }

    /// End a read transaction and hand the result through
    ///
    /// Nothing was written, so an `Err` result is not logged as a rollback.
    pub async fn finish_read<T, E>(&self, conn: &Connection, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let end = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
        if let Err(e) = conn.execute(end, ()).await {
            tracing::debug!(error = %e, "Failed to end read transaction");
            if result.is_ok() {
                return Err(DatabaseError::sql_execution(format!(
                    "Failed to end read transaction: {}",
                    e
                ))
                .into());
            }
        }
        result
    }

    /// Flush the WAL into the main database file
    ///
    /// Call before copying the database file or at shutdown.
    pub async fn db_close(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
            .await?;
        Ok(())
    }
}
