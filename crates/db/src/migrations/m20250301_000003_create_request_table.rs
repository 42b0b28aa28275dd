//! Create dehydration request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Request::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Request::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Request::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Request::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Request::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Request::FormedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Request::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Request::ModeratorId).string_len(32))
                    .col(ColumnDef::new(Request::PatientWeight).double())
                    .col(ColumnDef::new(Request::DehydrationPercent).double())
                    .col(ColumnDef::new(Request::FluidDeficit).double())
                    .col(ColumnDef::new(Request::DoctorComment).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_user")
                            .from(Request::Table, Request::UserId)
                            .to(User::Table, User::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_moderator")
                            .from(Request::Table, Request::ModeratorId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, status) — draft lookup and list filters
        manager
            .create_index(
                Index::create()
                    .name("idx_request_user_status")
                    .table(Request::Table)
                    .col(Request::UserId)
                    .col(Request::Status)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one draft per user; a racing
        // second insert fails with a unique violation
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX ux_request_user_draft
                ON dehydration_request (user_id)
                WHERE status = 'draft';
                ",
            )
            .await?;

        // Index: formed_at (date-range filter in list views)
        manager
            .create_index(
                Index::create()
                    .name("idx_request_formed_at")
                    .table(Request::Table)
                    .col(Request::FormedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Request::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Request {
    #[iden = "dehydration_request"]
    Table,
    Id,
    UserId,
    Status,
    CreatedAt,
    FormedAt,
    CompletedAt,
    ModeratorId,
    PatientWeight,
    DehydrationPercent,
    FluidDeficit,
    DoctorComment,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
