//! Situation entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Time of day a situation plausibly happens at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TimeBand {
    #[sea_orm(string_value = "anytime")]
    Anytime,
    #[sea_orm(string_value = "morning")]
    Morning,
    #[sea_orm(string_value = "midday")]
    Midday,
    #[sea_orm(string_value = "evening")]
    Evening,
}

impl TimeBand {
    /// Inclusive range of hours a post in this band may be stamped with.
    #[must_use]
    pub const fn hour_range(self) -> std::ops::RangeInclusive<u32> {
        match self {
            Self::Morning => 7..=11,
            Self::Midday => 12..=17,
            Self::Evening => 18..=23,
            Self::Anytime => 0..=23,
        }
    }
}

/// A short scenario fragment used as a generation theme.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "situation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text", unique)]
    pub content: String,

    pub time_band: TimeBand,

    #[sea_orm(indexed)]
    pub category_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::situation_category::Entity",
        from = "Column::CategoryId",
        to = "super::situation_category::Column::Id",
        on_delete = "Cascade"
    )]
    SituationCategory,
}

impl Related<super::situation_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SituationCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
