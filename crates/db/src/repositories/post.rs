//! Post repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, TransactionTrait,
};

use crate::db_error;
use crate::entities::post::{PostStatus, SentStatus};
use crate::entities::{Post, post, send_history, tuning_history};

/// Filter for post queues.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Restrict to one persona.
    pub persona_id: Option<String>,
    /// Restrict to one review status.
    pub status: Option<PostStatus>,
    /// Restrict to one delivery status.
    pub sent_status: Option<SentStatus>,
}

/// Repository for post operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post: {id}")))
    }

    /// Posts matching a filter, newest first.
    pub async fn find_filtered(&self, filter: &PostFilter) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find();

        if let Some(persona_id) = &filter.persona_id {
            query = query.filter(post::Column::PersonaId.eq(persona_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(post::Column::Status.eq(status));
        }
        if let Some(sent_status) = filter.sent_status {
            query = query.filter(post::Column::SentStatus.eq(sent_status));
        }

        query
            .order_by(post::Column::CreatedAt, Order::Desc)
            .order_by(post::Column::Id, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Replace a post's content and log the tuning step, atomically.
    pub async fn apply_regeneration(
        &self,
        history: tuning_history::ActiveModel,
        post: post::ActiveModel,
    ) -> AppResult<post::Model> {
        let txn = self.db.begin().await.map_err(db_error)?;

        history.insert(&txn).await.map_err(db_error)?;
        let updated = post.update(&txn).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;
        Ok(updated)
    }

    /// Record a successful export and mark the post sent, atomically.
    pub async fn record_delivery(
        &self,
        history: send_history::ActiveModel,
        post: post::ActiveModel,
    ) -> AppResult<(send_history::Model, post::Model)> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let entry = history.insert(&txn).await.map_err(db_error)?;
        let updated = post.update(&txn).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;
        Ok((entry, updated))
    }
}
