//! Persona group membership entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join row between a persona and a group.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persona_group_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub persona_id: String,

    #[sea_orm(indexed)]
    pub group_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::persona::Entity",
        from = "Column::PersonaId",
        to = "super::persona::Column::Id",
        on_delete = "Cascade"
    )]
    Persona,
    #[sea_orm(
        belongs_to = "super::persona_group::Entity",
        from = "Column::GroupId",
        to = "super::persona_group::Column::Id",
        on_delete = "Cascade"
    )]
    PersonaGroup,
}

impl Related<super::persona::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persona.def()
    }
}

impl Related<super::persona_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonaGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
