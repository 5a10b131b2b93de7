//! Application setting repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set,
};

use crate::db_error;
use crate::entities::{AppSetting, app_setting};

/// Repository for key/value settings.
#[derive(Clone)]
pub struct AppSettingRepository {
    db: Arc<DatabaseConnection>,
}

impl AppSettingRepository {
    /// Create a new setting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a setting by key.
    pub async fn find(&self, key: &str) -> AppResult<Option<app_setting::Model>> {
        AppSetting::find_by_id(key)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a setting by key, returning an error if not found.
    pub async fn get(&self, key: &str) -> AppResult<app_setting::Model> {
        self.find(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Setting: {key}")))
    }

    /// All settings, optionally restricted to one category.
    pub async fn find_all(&self, category: Option<&str>) -> AppResult<Vec<app_setting::Model>> {
        let mut query = AppSetting::find();
        if let Some(category) = category {
            query = query.filter(app_setting::Column::Category.eq(category));
        }

        query
            .order_by(app_setting::Column::Key, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Insert a setting unless the key already exists. Returns whether it was inserted.
    pub async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        description: &str,
        category: &str,
    ) -> AppResult<bool> {
        if self.find(key).await?.is_some() {
            return Ok(false);
        }

        app_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            description: Set(description.to_string()),
            category: Set(category.to_string()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(db_error)?;

        Ok(true)
    }

    /// Overwrite the value of an existing setting.
    pub async fn update_value(&self, key: &str, value: String) -> AppResult<app_setting::Model> {
        let setting = self.get(key).await?;

        let mut active: app_setting::ActiveModel = setting.into();
        active.value = Set(value);
        active.updated_at = Set(Some(Utc::now().into()));

        active.update(self.db.as_ref()).await.map_err(db_error)
    }
}
