//! Create request-symptom link table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RequestSymptom::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RequestSymptom::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RequestSymptom::RequestId).string_len(32).not_null())
                    .col(ColumnDef::new(RequestSymptom::SymptomId).string_len(32).not_null())
                    .col(ColumnDef::new(RequestSymptom::Intensity).integer())
                    .col(
                        ColumnDef::new(RequestSymptom::IsMain)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(RequestSymptom::Comment).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_symptom_request")
                            .from(RequestSymptom::Table, RequestSymptom::RequestId)
                            .to(Request::Table, Request::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_symptom_symptom")
                            .from(RequestSymptom::Table, RequestSymptom::SymptomId)
                            .to(Symptom::Table, Symptom::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (request_id, symptom_id) — duplicate link adds are
        // idempotent, resolved by ON CONFLICT DO NOTHING
        manager
            .create_index(
                Index::create()
                    .name("idx_request_symptom_pair")
                    .table(RequestSymptom::Table)
                    .col(RequestSymptom::RequestId)
                    .col(RequestSymptom::SymptomId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: symptom_id (reference check before catalog hard delete)
        manager
            .create_index(
                Index::create()
                    .name("idx_request_symptom_symptom")
                    .table(RequestSymptom::Table)
                    .col(RequestSymptom::SymptomId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RequestSymptom::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RequestSymptom {
    #[iden = "request_symptom"]
    Table,
    Id,
    RequestId,
    SymptomId,
    Intensity,
    IsMain,
    Comment,
}

#[derive(Iden)]
enum Request {
    #[iden = "dehydration_request"]
    Table,
    Id,
}

#[derive(Iden)]
enum Symptom {
    Table,
    Id,
}
