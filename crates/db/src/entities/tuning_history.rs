//! Tuning history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Record of one regeneration of a post.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tuning_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub post_id: String,

    pub created_at: DateTimeWithTimeZone,

    /// Content before this regeneration.
    #[sea_orm(column_type = "Text")]
    pub previous_content: String,

    /// Combined advice sent to the model.
    #[sea_orm(column_type = "Text")]
    pub advice_used: String,

    /// Content the model returned.
    #[sea_orm(column_type = "Text")]
    pub new_content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
