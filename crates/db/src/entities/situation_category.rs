//! Situation category entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grouping tag for situations ("daily", "romance", ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "situation_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::situation::Entity")]
    Situation,
}

impl Related<super::situation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Situation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
