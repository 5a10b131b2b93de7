//! Persona entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the fixed persona fields.
///
/// Custom fields registered at runtime may not reuse these names.
pub const CORE_FIELD_NAMES: &[&str] = &[
    "display_key",
    "nickname",
    "age",
    "birthday",
    "birthplace",
    "appearance",
    "personality",
    "strengths",
    "weaknesses",
    "speech_style",
    "catchphrase",
    "occupation",
    "hobbies",
    "likes",
    "dislikes",
    "backstory",
    "family",
    "turning_point",
    "secret",
    "allowed_categories",
];

/// A character whose voice generated posts emulate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persona")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Handle shown to operators; unique across personas.
    #[sea_orm(unique)]
    pub display_key: String,

    pub nickname: String,
    pub age: String,
    pub birthday: String,
    pub birthplace: String,

    #[sea_orm(column_type = "Text")]
    pub appearance: String,

    #[sea_orm(column_type = "Text")]
    pub personality: String,

    #[sea_orm(column_type = "Text")]
    pub strengths: String,

    #[sea_orm(column_type = "Text")]
    pub weaknesses: String,

    #[sea_orm(column_type = "Text")]
    pub speech_style: String,

    pub catchphrase: String,
    pub occupation: String,

    #[sea_orm(column_type = "Text")]
    pub hobbies: String,

    #[sea_orm(column_type = "Text")]
    pub likes: String,

    #[sea_orm(column_type = "Text")]
    pub dislikes: String,

    #[sea_orm(column_type = "Text")]
    pub backstory: String,

    #[sea_orm(column_type = "Text")]
    pub family: String,

    #[sea_orm(column_type = "Text")]
    pub turning_point: String,

    #[sea_orm(column_type = "Text")]
    pub secret: String,

    /// IDs of the situation categories this persona may draw from (JSON array).
    ///
    /// IDs survive a category rename; a deleted category leaves a dangling
    /// ID that generation reports as drift.
    #[sea_orm(column_type = "Text")]
    pub allowed_categories: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decode the allowed category IDs. Malformed data reads as empty.
    #[must_use]
    pub fn allowed_category_ids(&self) -> Vec<String> {
        serde_json::from_str(&self.allowed_categories).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
    #[sea_orm(has_many = "super::persona_field_value::Entity")]
    PersonaFieldValue,
    #[sea_orm(has_many = "super::persona_group_member::Entity")]
    PersonaGroupMember,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::persona_field_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonaFieldValue.def()
    }
}

impl Related<super::persona_group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonaGroupMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
