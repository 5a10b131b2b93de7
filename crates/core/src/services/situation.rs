//! Situation and category catalog service.

use castroom_common::{AppError, AppResult, IdGenerator};
use castroom_db::entities::situation::TimeBand;
use castroom_db::entities::{situation, situation_category};
use castroom_db::repositories::SituationRepository;
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a situation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSituationInput {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[serde(default = "default_time_band")]
    pub time_band: TimeBand,
    pub category_id: String,
}

const fn default_time_band() -> TimeBand {
    TimeBand::Anytime
}

/// Input for updating a situation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSituationInput {
    #[validate(length(min = 1, max = 1000))]
    pub content: Option<String>,
    pub time_band: Option<TimeBand>,
    pub category_id: Option<String>,
}

fn clean_name(name: &str, what: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation(format!(
            "{what} must be between 1 and 128 characters"
        )));
    }
    Ok(name.to_string())
}

/// Service for situations and their categories.
#[derive(Clone)]
pub struct SituationService {
    situation_repo: SituationRepository,
    id_gen: IdGenerator,
}

impl SituationService {
    /// Create a new situation service.
    #[must_use]
    pub const fn new(situation_repo: SituationRepository) -> Self {
        Self {
            situation_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Category Operations ====================

    /// Create a category.
    pub async fn create_category(&self, name: &str) -> AppResult<situation_category::Model> {
        let name = clean_name(name, "Category name")?;

        let model = situation_category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            created_at: Set(Utc::now().into()),
        };

        self.situation_repo.create_category(model).await
    }

    /// Rename a category. Personas refer to it by ID and keep access.
    pub async fn rename_category(&self, id: &str, name: &str) -> AppResult<situation_category::Model> {
        let name = clean_name(name, "Category name")?;
        let category = self.situation_repo.get_category_by_id(id).await?;
        let old_name = category.name.clone();

        let mut active: situation_category::ActiveModel = category.into();
        active.name = Set(name);
        let renamed = self.situation_repo.update_category(active).await?;

        tracing::info!(from = %old_name, to = %renamed.name, "Renamed situation category");
        Ok(renamed)
    }

    /// Delete a category together with its situations.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        let situations = self.situation_repo.count_by_category(id).await?;
        self.situation_repo.delete_category(id).await?;
        tracing::info!(category_id = %id, situations, "Deleted situation category");
        Ok(())
    }

    /// All categories by name.
    pub async fn list_categories(&self) -> AppResult<Vec<situation_category::Model>> {
        self.situation_repo.find_all_categories().await
    }

    // ==================== Situation Operations ====================

    /// Create a situation in an existing category.
    pub async fn create(&self, input: CreateSituationInput) -> AppResult<situation::Model> {
        input.validate()?;
        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Validation("Situation must not be blank".to_string()));
        }

        let model = situation::ActiveModel {
            id: Set(self.id_gen.generate()),
            content: Set(content),
            time_band: Set(input.time_band),
            category_id: Set(input.category_id),
            created_at: Set(Utc::now().into()),
        };

        self.situation_repo.create(model).await
    }

    /// Change a situation's text, band or category.
    pub async fn update(&self, id: &str, input: UpdateSituationInput) -> AppResult<situation::Model> {
        input.validate()?;
        let situation = self.situation_repo.get_by_id(id).await?;

        let mut active: situation::ActiveModel = situation.into();
        if let Some(content) = input.content {
            let content = content.trim().to_string();
            if content.is_empty() {
                return Err(AppError::Validation("Situation must not be blank".to_string()));
            }
            active.content = Set(content);
        }
        if let Some(time_band) = input.time_band {
            active.time_band = Set(time_band);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }

        self.situation_repo.update(active).await
    }

    /// Get a situation.
    pub async fn get(&self, id: &str) -> AppResult<situation::Model> {
        self.situation_repo.get_by_id(id).await
    }

    /// List situations, optionally by category.
    pub async fn list(&self, category_id: Option<&str>) -> AppResult<Vec<situation::Model>> {
        self.situation_repo.find_all(category_id).await
    }

    /// Delete a situation.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.situation_repo.delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use castroom_db::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_situation_needs_existing_category() {
        let db = TestDatabase::new().await.unwrap();
        let service = SituationService::new(SituationRepository::new(db.shared()));

        let err = service
            .create(CreateSituationInput {
                content: "rainy night".to_string(),
                time_band: TimeBand::Evening,
                category_id: "missing".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_delete_category_removes_situations() {
        let db = TestDatabase::new().await.unwrap();
        let service = SituationService::new(SituationRepository::new(db.shared()));

        let daily = service.create_category("daily").await.unwrap();
        let s = service
            .create(CreateSituationInput {
                content: "rainy night".to_string(),
                time_band: TimeBand::Evening,
                category_id: daily.id.clone(),
            })
            .await
            .unwrap();

        service.delete_category(&daily.id).await.unwrap();
        assert!(matches!(service.get(&s.id).await, Err(AppError::NotFound(_))));
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_category_name_is_conflict() {
        let db = TestDatabase::new().await.unwrap();
        let service = SituationService::new(SituationRepository::new(db.shared()));

        service.create_category("daily").await.unwrap();
        let err = service.create_category("daily").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(matches!(
            service.create_category("   ").await,
            Err(AppError::Validation(_))
        ));
    }
}
