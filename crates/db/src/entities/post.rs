//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Waiting for review.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Accepted for publishing.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Discarded; kept for audit.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl PostStatus {
    /// Lowercase name, as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Operator quality mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    #[sea_orm(string_value = "unrated")]
    Unrated,
    #[sea_orm(string_value = "excellent")]
    Excellent,
    #[sea_orm(string_value = "good")]
    Good,
    #[sea_orm(string_value = "fair")]
    Fair,
    #[sea_orm(string_value = "poor")]
    Poor,
}

/// Whether the post reached the export sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SentStatus {
    #[sea_orm(string_value = "not_sent")]
    NotSent,
    #[sea_orm(string_value = "sent")]
    Sent,
}

/// A generated social post and its review state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub persona_id: String,

    /// Plausible posting time drawn from the situation's band.
    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Situation text, or a shortened campaign instruction.
    #[sea_orm(column_type = "Text")]
    pub theme: String,

    pub evaluation: Evaluation,

    /// Canned advice picked during review (JSON array of strings).
    #[sea_orm(column_type = "Text")]
    pub advice: String,

    #[sea_orm(column_type = "Text")]
    pub free_advice: String,

    pub status: PostStatus,

    /// Time of day the post goes out; set on approval.
    #[sea_orm(nullable)]
    pub posted_at: Option<Time>,

    pub sent_status: SentStatus,

    #[sea_orm(nullable)]
    pub sent_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decode the canned advice list. Malformed data reads as empty.
    #[must_use]
    pub fn advice_list(&self) -> Vec<String> {
        serde_json::from_str(&self.advice).unwrap_or_default()
    }
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
    #[sea_orm(has_many = "super::tuning_history::Entity")]
    TuningHistory,
    #[sea_orm(has_many = "super::send_history::Entity")]
    SendHistory,
}

impl Related<super::persona::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persona.def()
    }
}

impl Related<super::tuning_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TuningHistory.def()
    }
}

impl Related<super::send_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SendHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
