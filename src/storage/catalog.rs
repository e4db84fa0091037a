use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lists user tables from the database's `sqlite_master` catalog.
const TABLE_NAMES_QUERY: &str = "SELECT name FROM sqlite_master WHERE type='table'";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open database: {0}")]
    Open(#[source] sqlx::Error),
    #[error("failed to query database: {0}")]
    Query(#[source] sqlx::Error),
}

/// Read-only view of the SQLite database the update tool loads into.
///
/// Every call opens its own connection; nothing is pooled or cached, so the
/// listing always reflects the file as the update tool last left it.
#[derive(Debug, Clone)]
pub struct TableCatalog {
    database_path: PathBuf,
}

impl TableCatalog {
    pub fn new<P: AsRef<Path>>(database_path: P) -> Self {
        Self {
            database_path: database_path.as_ref().to_path_buf(),
        }
    }

    /// Table names in the order SQLite returns them.
    ///
    /// Rows whose name cannot be decoded are logged and skipped.
    pub async fn table_names(&self) -> Result<Vec<String>, CatalogError> {
        let mut conn = self.connect().await?;

        let rows = sqlx::query(TABLE_NAMES_QUERY)
            .fetch_all(&mut conn)
            .await
            .map_err(CatalogError::Query)?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            match row.try_get::<String, _>(0) {
                Ok(name) => names.push(name),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable catalog row"),
            }
        }

        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "Failed to close catalog connection cleanly");
        }

        Ok(names)
    }

    async fn connect(&self) -> Result<SqliteConnection, CatalogError> {
        SqliteConnectOptions::new()
            .filename(&self.database_path)
            .read_only(true)
            .connect()
            .await
            .map_err(CatalogError::Open)
    }
}
