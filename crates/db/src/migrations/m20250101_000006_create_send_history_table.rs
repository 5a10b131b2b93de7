//! Create `send_history` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SendHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SendHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SendHistory::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(SendHistory::Destination)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SendHistory::AttemptedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SendHistory::ScheduledFor)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SendHistory::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SendHistory::ErrorMessage).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_send_history_post")
                            .from(SendHistory::Table, SendHistory::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_send_history_post_id")
                    .table(SendHistory::Table)
                    .col(SendHistory::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SendHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SendHistory {
    Table,
    Id,
    PostId,
    Destination,
    AttemptedAt,
    ScheduledFor,
    Status,
    ErrorMessage,
}

#[derive(Iden)]
pub enum Post {
    Table,
    Id,
}
