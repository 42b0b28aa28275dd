//! Create symptom table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Symptom::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Symptom::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Symptom::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Symptom::Category).string_len(100).not_null().default(""))
                    .col(ColumnDef::new(Symptom::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Symptom::Severity).string_len(50).not_null().default(""))
                    .col(ColumnDef::new(Symptom::WeightLoss).string_len(50).not_null().default(""))
                    .col(ColumnDef::new(Symptom::FluidNeed).string_len(50).not_null().default(""))
                    .col(
                        ColumnDef::new(Symptom::RecoveryTime)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Symptom::ImageKey).string_len(200))
                    .col(ColumnDef::new(Symptom::IsActive).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        // Unique index: title (violations surface as a 400, not a 500)
        manager
            .create_index(
                Index::create()
                    .name("idx_symptom_title")
                    .table(Symptom::Table)
                    .col(Symptom::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: is_active (catalog listing filters on it)
        manager
            .create_index(
                Index::create()
                    .name("idx_symptom_is_active")
                    .table(Symptom::Table)
                    .col(Symptom::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Symptom::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Symptom {
    Table,
    Id,
    Title,
    Category,
    Description,
    Severity,
    WeightLoss,
    FluidNeed,
    RecoveryTime,
    ImageKey,
    IsActive,
}
