//! Custom persona field value entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Value of one custom field for one persona.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persona_field_value")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub persona_id: String,

    pub field_id: String,

    #[sea_orm(column_type = "Text")]
    pub value: String,
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
        belongs_to = "super::persona_field::Entity",
        from = "Column::FieldId",
        to = "super::persona_field::Column::Id",
        on_delete = "Cascade"
    )]
    PersonaField,
}

impl Related<super::persona::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persona.def()
    }
}

impl Related<super::persona_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonaField.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
