//! Create persona, `persona_field`, and `persona_field_value` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Persona::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Persona::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Persona::DisplayKey)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Persona::Nickname).string().not_null().default(""))
                    .col(ColumnDef::new(Persona::Age).string().not_null().default(""))
                    .col(ColumnDef::new(Persona::Birthday).string().not_null().default(""))
                    .col(ColumnDef::new(Persona::Birthplace).string().not_null().default(""))
                    .col(ColumnDef::new(Persona::Appearance).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Personality).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Strengths).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Weaknesses).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::SpeechStyle).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Catchphrase).string().not_null().default(""))
                    .col(ColumnDef::new(Persona::Occupation).string().not_null().default(""))
                    .col(ColumnDef::new(Persona::Hobbies).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Likes).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Dislikes).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Backstory).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Family).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::TurningPoint).text().not_null().default(""))
                    .col(ColumnDef::new(Persona::Secret).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Persona::AllowedCategories)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Persona::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Persona::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonaField::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonaField::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PersonaField::Name)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PersonaField::Label).string_len(128).not_null())
                    .col(
                        ColumnDef::new(PersonaField::InputKind)
                            .string_len(16)
                            .not_null()
                            .default("text"),
                    )
                    .col(
                        ColumnDef::new(PersonaField::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PersonaField::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PersonaField::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonaFieldValue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonaFieldValue::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PersonaFieldValue::PersonaId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonaFieldValue::FieldId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonaFieldValue::Value)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persona_field_value_persona")
                            .from(PersonaFieldValue::Table, PersonaFieldValue::PersonaId)
                            .to(Persona::Table, Persona::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persona_field_value_field")
                            .from(PersonaFieldValue::Table, PersonaFieldValue::FieldId)
                            .to(PersonaField::Table, PersonaField::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One value per (persona, field)
        manager
            .create_index(
                Index::create()
                    .name("idx_persona_field_value_persona_field")
                    .table(PersonaFieldValue::Table)
                    .col(PersonaFieldValue::PersonaId)
                    .col(PersonaFieldValue::FieldId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PersonaFieldValue::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonaField::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persona::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Persona {
    Table,
    Id,
    DisplayKey,
    Nickname,
    Age,
    Birthday,
    Birthplace,
    Appearance,
    Personality,
    Strengths,
    Weaknesses,
    SpeechStyle,
    Catchphrase,
    Occupation,
    Hobbies,
    Likes,
    Dislikes,
    Backstory,
    Family,
    TurningPoint,
    Secret,
    AllowedCategories,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum PersonaField {
    Table,
    Id,
    Name,
    Label,
    InputKind,
    Required,
    SortOrder,
    CreatedAt,
}

#[derive(Iden)]
pub enum PersonaFieldValue {
    Table,
    Id,
    PersonaId,
    FieldId,
    Value,
}
