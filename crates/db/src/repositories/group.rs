//! Persona group repository.

use std::sync::Arc;

use castroom_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use sea_orm::sea_query::JoinType;

use crate::db_error;
use crate::entities::{PersonaGroup, PersonaGroupMember, persona_group, persona_group_member};

/// Repository for persona groups and memberships.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<persona_group::Model>> {
        PersonaGroup::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a group by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<persona_group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group: {id}")))
    }

    /// All groups ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<persona_group::Model>> {
        PersonaGroup::find()
            .order_by(persona_group::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a group.
    pub async fn create(&self, model: persona_group::ActiveModel) -> AppResult<persona_group::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a group.
    pub async fn update(&self, model: persona_group::ActiveModel) -> AppResult<persona_group::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a group. Memberships go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = PersonaGroup::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Group: {id}")));
        }
        Ok(())
    }

    // ==================== Membership ====================

    /// Groups a persona belongs to, ordered by name.
    pub async fn find_by_persona(&self, persona_id: &str) -> AppResult<Vec<persona_group::Model>> {
        PersonaGroup::find()
            .join(
                JoinType::InnerJoin,
                persona_group::Relation::PersonaGroupMember.def(),
            )
            .filter(persona_group_member::Column::PersonaId.eq(persona_id))
            .order_by(persona_group::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Persona IDs in a group.
    pub async fn find_member_ids(&self, group_id: &str) -> AppResult<Vec<String>> {
        let members = PersonaGroupMember::find()
            .filter(persona_group_member::Column::GroupId.eq(group_id))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(members.into_iter().map(|m| m.persona_id).collect())
    }

    /// Replace every membership of a persona in one transaction.
    pub async fn replace_memberships(
        &self,
        persona_id: &str,
        members: Vec<persona_group_member::ActiveModel>,
    ) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_error)?;

        PersonaGroupMember::delete_many()
            .filter(persona_group_member::Column::PersonaId.eq(persona_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        for member in members {
            member.insert(&txn).await.map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)
    }
}
