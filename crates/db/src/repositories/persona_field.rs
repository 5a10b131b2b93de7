//! Custom persona field repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder,
};

use crate::db_error;
use crate::entities::{PersonaField, persona_field};

/// Repository for the custom field registry.
#[derive(Clone)]
pub struct PersonaFieldRepository {
    db: Arc<DatabaseConnection>,
}

impl PersonaFieldRepository {
    /// Create a new persona field repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a field by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<persona_field::Model>> {
        PersonaField::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a field by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<persona_field::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Persona field: {id}")))
    }

    /// Find a field by machine name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<persona_field::Model>> {
        PersonaField::find()
            .filter(persona_field::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// All fields in display order.
    pub async fn find_all(&self) -> AppResult<Vec<persona_field::Model>> {
        PersonaField::find()
            .order_by(persona_field::Column::SortOrder, Order::Asc)
            .order_by(persona_field::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Register a field.
    pub async fn create(&self, model: persona_field::ActiveModel) -> AppResult<persona_field::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a field definition.
    pub async fn update(&self, model: persona_field::ActiveModel) -> AppResult<persona_field::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Remove a field. Stored values for it are dropped too.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = PersonaField::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Persona field: {id}")));
        }
        Ok(())
    }
}
