//! Application setting entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operator-tunable key/value setting.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_setting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    #[sea_orm(column_type = "Text")]
    pub value: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category: String,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
