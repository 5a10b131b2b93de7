//! Canned advice catalog service.

use castroom_common::{AppError, AppResult, IdGenerator};
use castroom_db::entities::advice_master;
use castroom_db::repositories::AdviceRepository;
use chrono::Utc;
use sea_orm::Set;

/// Service for the canned advice operators pick while tuning.
#[derive(Clone)]
pub struct AdviceService {
    advice_repo: AdviceRepository,
    id_gen: IdGenerator,
}

fn clean(content: &str) -> AppResult<String> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > 500 {
        return Err(AppError::Validation(
            "Advice must be between 1 and 500 characters".to_string(),
        ));
    }
    Ok(content.to_string())
}

impl AdviceService {
    /// Create a new advice service.
    #[must_use]
    pub const fn new(advice_repo: AdviceRepository) -> Self {
        Self {
            advice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add an entry.
    pub async fn create(&self, content: &str) -> AppResult<advice_master::Model> {
        let model = advice_master::ActiveModel {
            id: Set(self.id_gen.generate()),
            content: Set(clean(content)?),
            created_at: Set(Utc::now().into()),
        };
        self.advice_repo.create(model).await
    }

    /// Edit an entry.
    pub async fn update(&self, id: &str, content: &str) -> AppResult<advice_master::Model> {
        let content = clean(content)?;
        let advice = self.advice_repo.get_by_id(id).await?;

        let mut active: advice_master::ActiveModel = advice.into();
        active.content = Set(content);
        self.advice_repo.update(active).await
    }

    /// All entries.
    pub async fn list(&self) -> AppResult<Vec<advice_master::Model>> {
        self.advice_repo.find_all().await
    }

    /// Delete an entry. Posts keep the text they were tuned with.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.advice_repo.delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use castroom_db::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_advice_content_is_unique() {
        let db = TestDatabase::new().await.unwrap();
        let service = AdviceService::new(AdviceRepository::new(db.shared()));

        service.create("Make it shorter").await.unwrap();
        let err = service.create("  Make it shorter ").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(matches!(service.create(" ").await, Err(AppError::Validation(_))));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
