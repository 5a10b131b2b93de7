//! Create post and `tuning_history` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::PersonaId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Post::Content).text().not_null())
                    .col(ColumnDef::new(Post::Theme).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Post::Evaluation)
                            .string_len(16)
                            .not_null()
                            .default("unrated"),
                    )
                    .col(ColumnDef::new(Post::Advice).text().not_null().default("[]"))
                    .col(ColumnDef::new(Post::FreeAdvice).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Post::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Post::PostedAt).time())
                    .col(
                        ColumnDef::new(Post::SentStatus)
                            .string_len(16)
                            .not_null()
                            .default("not_sent"),
                    )
                    .col(ColumnDef::new(Post::SentAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Post::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_persona")
                            .from(Post::Table, Post::PersonaId)
                            .to(Persona::Table, Persona::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Review queues filter by persona and status
        manager
            .create_index(
                Index::create()
                    .name("idx_post_persona_status")
                    .table(Post::Table)
                    .col(Post::PersonaId)
                    .col(Post::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_created_at")
                    .table(Post::Table)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TuningHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TuningHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TuningHistory::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(TuningHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(TuningHistory::PreviousContent).text().not_null())
                    .col(
                        ColumnDef::new(TuningHistory::AdviceUsed)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(TuningHistory::NewContent).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tuning_history_post")
                            .from(TuningHistory::Table, TuningHistory::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tuning_history_post_id")
                    .table(TuningHistory::Table)
                    .col(TuningHistory::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TuningHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Post {
    Table,
    Id,
    PersonaId,
    CreatedAt,
    Content,
    Theme,
    Evaluation,
    Advice,
    FreeAdvice,
    Status,
    PostedAt,
    SentStatus,
    SentAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum TuningHistory {
    Table,
    Id,
    PostId,
    CreatedAt,
    PreviousContent,
    AdviceUsed,
    NewContent,
}

#[derive(Iden)]
pub enum Persona {
    Table,
    Id,
}
