//! Database layer for castroom.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use castroom_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt).await.map_err(db_error)
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None).await.map_err(db_error)
}

/// Map a store error onto the operator-facing error kinds.
///
/// Unique violations become [`AppError::Conflict`], foreign key violations
/// [`AppError::ConstraintViolation`]. Everything else is a database error.
#[must_use]
pub fn db_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => AppError::Conflict(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::ConstraintViolation(msg),
        _ => match err {
            DbErr::RecordNotFound(msg) => AppError::NotFound(msg),
            DbErr::RecordNotUpdated => AppError::NotFound("Record not updated".to_string()),
            other => AppError::Database(other.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err = db_error(DbErr::RecordNotFound("post".to_string()));
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_other_errors_map_to_database() {
        let err = db_error(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, AppError::Database(_)));
        assert!(err.is_transient());
    }
}
