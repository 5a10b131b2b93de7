//! Create `persona_group` and `persona_group_member` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PersonaGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonaGroup::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PersonaGroup::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PersonaGroup::Content)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PersonaGroup::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(PersonaGroup::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonaGroupMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonaGroupMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PersonaGroupMember::PersonaId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonaGroupMember::GroupId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonaGroupMember::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persona_group_member_persona")
                            .from(PersonaGroupMember::Table, PersonaGroupMember::PersonaId)
                            .to(Persona::Table, Persona::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persona_group_member_group")
                            .from(PersonaGroupMember::Table, PersonaGroupMember::GroupId)
                            .to(PersonaGroup::Table, PersonaGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_persona_group_member_unique")
                    .table(PersonaGroupMember::Table)
                    .col(PersonaGroupMember::PersonaId)
                    .col(PersonaGroupMember::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_persona_group_member_group_id")
                    .table(PersonaGroupMember::Table)
                    .col(PersonaGroupMember::GroupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PersonaGroupMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonaGroup::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PersonaGroup {
    Table,
    Id,
    Name,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum PersonaGroupMember {
    Table,
    Id,
    PersonaId,
    GroupId,
    CreatedAt,
}

#[derive(Iden)]
pub enum Persona {
    Table,
    Id,
}
