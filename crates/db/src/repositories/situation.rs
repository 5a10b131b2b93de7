//! Situation and situation category repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::db_error;
use crate::entities::{Situation, SituationCategory, situation, situation_category};

/// Repository for situations and their categories.
#[derive(Clone)]
pub struct SituationRepository {
    db: Arc<DatabaseConnection>,
}

impl SituationRepository {
    /// Create a new situation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Category Operations ====================

    /// Find a category by ID.
    pub async fn find_category_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<situation_category::Model>> {
        SituationCategory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a category by ID, returning an error if not found.
    pub async fn get_category_by_id(&self, id: &str) -> AppResult<situation_category::Model> {
        self.find_category_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category: {id}")))
    }

    /// Find a category by name.
    pub async fn find_category_by_name(
        &self,
        name: &str,
    ) -> AppResult<Option<situation_category::Model>> {
        SituationCategory::find()
            .filter(situation_category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find categories by ID. Unknown IDs are simply absent.
    pub async fn find_categories_by_ids(
        &self,
        ids: &[String],
    ) -> AppResult<Vec<situation_category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        SituationCategory::find()
            .filter(situation_category::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// All categories ordered by name.
    pub async fn find_all_categories(&self) -> AppResult<Vec<situation_category::Model>> {
        SituationCategory::find()
            .order_by(situation_category::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a category.
    pub async fn create_category(
        &self,
        model: situation_category::ActiveModel,
    ) -> AppResult<situation_category::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a category.
    pub async fn update_category(
        &self,
        model: situation_category::ActiveModel,
    ) -> AppResult<situation_category::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a category and, through the cascade, its situations.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        let result = SituationCategory::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Category: {id}")));
        }
        Ok(())
    }

    // ==================== Situation Operations ====================

    /// Find a situation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<situation::Model>> {
        Situation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a situation by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<situation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Situation: {id}")))
    }

    /// List situations, optionally restricted to one category.
    pub async fn find_all(&self, category_id: Option<&str>) -> AppResult<Vec<situation::Model>> {
        let mut query = Situation::find();
        if let Some(category_id) = category_id {
            query = query.filter(situation::Column::CategoryId.eq(category_id));
        }

        query
            .order_by(situation::Column::CreatedAt, Order::Asc)
            .order_by(situation::Column::Id, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Situations in any of the given categories.
    pub async fn find_by_category_ids(
        &self,
        category_ids: &[String],
    ) -> AppResult<Vec<situation::Model>> {
        if category_ids.is_empty() {
            return Ok(vec![]);
        }

        Situation::find()
            .filter(situation::Column::CategoryId.is_in(category_ids.iter().map(String::as_str)))
            .order_by(situation::Column::Id, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count situations in a category.
    pub async fn count_by_category(&self, category_id: &str) -> AppResult<u64> {
        Situation::find()
            .filter(situation::Column::CategoryId.eq(category_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a situation.
    pub async fn create(&self, model: situation::ActiveModel) -> AppResult<situation::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a situation.
    pub async fn update(&self, model: situation::ActiveModel) -> AppResult<situation::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a situation.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Situation::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Situation: {id}")));
        }
        Ok(())
    }
}
