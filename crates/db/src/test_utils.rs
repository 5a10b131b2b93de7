//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with all migrations applied.

use std::sync::Arc;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// In-memory URL. Every pool connection would open its own database, so the
/// pool is pinned to a single connection.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(std::time::Duration::from_secs(3600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }

    /// Shared handle, as repositories take it.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Delete all rows from every application table.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let tables = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
                    .to_string(),
            ))
            .await?;

        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                "PRAGMA foreign_keys = OFF".to_string(),
            ))
            .await?;

        for row in tables {
            if let Ok(table_name) = row.try_get::<String>("", "name") {
                if table_name == "seaql_migrations" {
                    continue;
                }

                let delete = format!("DELETE FROM \"{table_name}\"");
                self.conn
                    .execute(Statement::from_string(DatabaseBackend::Sqlite, delete))
                    .await?;
            }
        }

        self.conn
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                "PRAGMA foreign_keys = ON".to_string(),
            ))
            .await?;

        info!("Cleaned up test database");
        Ok(())
    }

    /// Run a test against a fresh database.
    ///
    /// Example:
    /// ```ignore
    /// TestDatabase::run_test(|db| async {
    ///     let conn = db.connection();
    ///     // use connection...
    ///     Ok(())
    /// }).await?;
    /// ```
    pub async fn run_test<F, Fut, T>(f: F) -> Result<T, DbErr>
    where
        F: for<'a> FnOnce(&'a Self) -> Fut,
        Fut: std::future::Future<Output = Result<T, DbErr>>,
    {
        let db = Self::new().await?;
        let result = f(&db).await;
        db.cleanup().await?;
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_database_has_tables() {
        let db = TestDatabase::new().await.unwrap();
        let rows = db
            .connection()
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'post'".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_schema() {
        let db = TestDatabase::new().await.unwrap();
        db.cleanup().await.unwrap();
        db.cleanup().await.unwrap();
    }
}
