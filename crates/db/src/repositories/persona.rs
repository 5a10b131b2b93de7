//! Persona repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::db_error;
use crate::entities::{Persona, PersonaFieldValue, persona, persona_field_value};

/// Repository for persona operations.
#[derive(Clone)]
pub struct PersonaRepository {
    db: Arc<DatabaseConnection>,
}

impl PersonaRepository {
    /// Create a new persona repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a persona by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<persona::Model>> {
        Persona::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a persona by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<persona::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Persona: {id}")))
    }

    /// Find a persona by its display key.
    pub async fn find_by_display_key(&self, display_key: &str) -> AppResult<Option<persona::Model>> {
        Persona::find()
            .filter(persona::Column::DisplayKey.eq(display_key))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// List all personas ordered by display key.
    pub async fn find_all(&self) -> AppResult<Vec<persona::Model>> {
        Persona::find()
            .order_by(persona::Column::DisplayKey, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count personas.
    pub async fn count(&self) -> AppResult<u64> {
        Persona::find().count(self.db.as_ref()).await.map_err(db_error)
    }

    /// Create a new persona.
    pub async fn create(&self, model: persona::ActiveModel) -> AppResult<persona::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a persona.
    pub async fn update(&self, model: persona::ActiveModel) -> AppResult<persona::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a persona. Posts, field values and memberships go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Persona::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Persona: {id}")));
        }
        Ok(())
    }

    // ==================== Custom Field Values ====================

    /// Custom field values stored for a persona.
    pub async fn find_field_values(
        &self,
        persona_id: &str,
    ) -> AppResult<Vec<persona_field_value::Model>> {
        PersonaFieldValue::find()
            .filter(persona_field_value::Column::PersonaId.eq(persona_id))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Insert or overwrite the value of one custom field for a persona.
    pub async fn upsert_field_value(
        &self,
        id: String,
        persona_id: &str,
        field_id: &str,
        value: String,
    ) -> AppResult<persona_field_value::Model> {
        let existing = PersonaFieldValue::find()
            .filter(persona_field_value::Column::PersonaId.eq(persona_id))
            .filter(persona_field_value::Column::FieldId.eq(field_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if let Some(existing) = existing {
            let mut active: persona_field_value::ActiveModel = existing.into();
            active.value = Set(value);
            return active.update(self.db.as_ref()).await.map_err(db_error);
        }

        persona_field_value::ActiveModel {
            id: Set(id),
            persona_id: Set(persona_id.to_string()),
            field_id: Set(field_id.to_string()),
            value: Set(value),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(db_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TestDatabase;
    use chrono::Utc;

    fn persona_model(id: &str, display_key: &str) -> persona::ActiveModel {
        persona::ActiveModel {
            id: Set(id.to_string()),
            display_key: Set(display_key.to_string()),
            nickname: Set(String::new()),
            age: Set(String::new()),
            birthday: Set(String::new()),
            birthplace: Set(String::new()),
            appearance: Set(String::new()),
            personality: Set(String::new()),
            strengths: Set(String::new()),
            weaknesses: Set(String::new()),
            speech_style: Set(String::new()),
            catchphrase: Set(String::new()),
            occupation: Set(String::new()),
            hobbies: Set(String::new()),
            likes: Set(String::new()),
            dislikes: Set(String::new()),
            backstory: Set(String::new()),
            family: Set(String::new()),
            turning_point: Set(String::new()),
            secret: Set(String::new()),
            allowed_categories: Set("[]".to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
    }

    #[tokio::test]
    async fn test_duplicate_display_key_is_conflict() {
        let db = TestDatabase::new().await.unwrap();
        let repo = PersonaRepository::new(db.shared());

        repo.create(persona_model("p1", "mira")).await.unwrap();
        let err = repo.create(persona_model("p2", "mira")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = TestDatabase::new().await.unwrap();
        let repo = PersonaRepository::new(db.shared());

        let err = repo.delete("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
