//! Canned advice repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Order, QueryOrder};

use crate::db_error;
use crate::entities::{AdviceMaster, advice_master};

/// Repository for the canned advice catalog.
#[derive(Clone)]
pub struct AdviceRepository {
    db: Arc<DatabaseConnection>,
}

impl AdviceRepository {
    /// Create a new advice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an advice entry by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<advice_master::Model>> {
        AdviceMaster::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get an advice entry by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<advice_master::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Advice: {id}")))
    }

    /// All entries in insertion order.
    pub async fn find_all(&self) -> AppResult<Vec<advice_master::Model>> {
        AdviceMaster::find()
            .order_by(advice_master::Column::CreatedAt, Order::Asc)
            .order_by(advice_master::Column::Id, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Add an entry.
    pub async fn create(&self, model: advice_master::ActiveModel) -> AppResult<advice_master::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Edit an entry.
    pub async fn update(&self, model: advice_master::ActiveModel) -> AppResult<advice_master::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete an entry.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = AdviceMaster::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Advice: {id}")));
        }
        Ok(())
    }
}
