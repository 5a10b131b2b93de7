//! Persona group service.

use castroom_common::{AppError, AppResult, IdGenerator};
use castroom_db::entities::persona_group;
use castroom_db::repositories::GroupRepository;
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,
}

/// Input for updating a group.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub content: Option<String>,
}

/// Service for persona groups (shared overlay text).
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<persona_group::Model> {
        input.validate()?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Group name must not be blank".to_string()));
        }

        let model = persona_group::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.group_repo.create(model).await
    }

    /// Rename a group or change its overlay text.
    pub async fn update(&self, id: &str, input: UpdateGroupInput) -> AppResult<persona_group::Model> {
        input.validate()?;
        let group = self.group_repo.get_by_id(id).await?;

        let mut active: persona_group::ActiveModel = group.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("Group name must not be blank".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.group_repo.update(active).await
    }

    /// Get a group.
    pub async fn get(&self, id: &str) -> AppResult<persona_group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// All groups by name.
    pub async fn list(&self) -> AppResult<Vec<persona_group::Model>> {
        self.group_repo.find_all().await
    }

    /// Persona IDs belonging to a group.
    pub async fn members(&self, id: &str) -> AppResult<Vec<String>> {
        self.group_repo.get_by_id(id).await?;
        self.group_repo.find_member_ids(id).await
    }

    /// Delete a group. Personas lose the membership, nothing else.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.group_repo.delete(id).await
    }
}
