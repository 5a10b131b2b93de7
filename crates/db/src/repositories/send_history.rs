//! Send history repository.

use std::sync::Arc;

use castroom_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder,
};

use crate::db_error;
use crate::entities::{SendHistory, send_history};

/// Repository for export attempts.
#[derive(Clone)]
pub struct SendHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SendHistoryRepository {
    /// Create a new send history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record an attempt.
    pub async fn create(&self, model: send_history::ActiveModel) -> AppResult<send_history::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Attempts for a post, newest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<send_history::Model>> {
        SendHistory::find()
            .filter(send_history::Column::PostId.eq(post_id))
            .order_by(send_history::Column::AttemptedAt, Order::Desc)
            .order_by(send_history::Column::Id, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }
}
