//! Tuning history repository.

use std::sync::Arc;

use castroom_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder,
};

use crate::db_error;
use crate::entities::{TuningHistory, tuning_history};

/// Repository for regeneration history.
#[derive(Clone)]
pub struct TuningHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl TuningHistoryRepository {
    /// Create a new tuning history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry outside of a regeneration.
    pub async fn create(
        &self,
        model: tuning_history::ActiveModel,
    ) -> AppResult<tuning_history::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Entries for a post, newest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<tuning_history::Model>> {
        TuningHistory::find()
            .filter(tuning_history::Column::PostId.eq(post_id))
            .order_by(tuning_history::Column::CreatedAt, Order::Desc)
            .order_by(tuning_history::Column::Id, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }
}
