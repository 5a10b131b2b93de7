//! Persona group entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shared background text appended to every member persona's sheet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persona_group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    /// Overlay text.
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::persona_group_member::Entity")]
    PersonaGroupMember,
}

impl Related<super::persona_group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonaGroupMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
