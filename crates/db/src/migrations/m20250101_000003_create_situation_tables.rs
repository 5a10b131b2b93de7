//! Create `situation_category` and situation tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SituationCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SituationCategory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SituationCategory::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SituationCategory::CreatedAt)
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
                    .table(Situation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Situation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Situation::Content)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Situation::TimeBand)
                            .string_len(16)
                            .not_null()
                            .default("anytime"),
                    )
                    .col(ColumnDef::new(Situation::CategoryId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Situation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_situation_category")
                            .from(Situation::Table, Situation::CategoryId)
                            .to(SituationCategory::Table, SituationCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_situation_category_id")
                    .table(Situation::Table)
                    .col(Situation::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Situation::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SituationCategory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SituationCategory {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
pub enum Situation {
    Table,
    Id,
    Content,
    TimeBand,
    CategoryId,
    CreatedAt,
}
