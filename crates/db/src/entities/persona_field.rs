//! Custom persona field registry entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the operator form renders a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum FieldInputKind {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "textarea")]
    TextArea,
}

/// An operator-defined persona attribute.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persona_field")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Machine name, `^[a-z][a-z0-9_]{0,31}$`.
    #[sea_orm(unique)]
    pub name: String,

    /// Label used in forms and in the compiled character sheet.
    pub label: String,

    pub input_kind: FieldInputKind,

    pub required: bool,

    pub sort_order: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::persona_field_value::Entity")]
    PersonaFieldValue,
}

impl Related<super::persona_field_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonaFieldValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
