//! Create `driver` table with FK to `team`.
//!
//! Deleting a team removes its drivers.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Driver::Table)
                    .if_not_exists()
                    .col(pk_auto(Driver::Id))
                    .col(integer(Driver::TeamId).not_null())
                    .col(string_len(Driver::Name, 100).not_null())
                    .col(integer(Driver::CarNumber).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_team")
                            .from(Driver::Table, Driver::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Driver::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Driver { Table, Id, TeamId, Name, CarNumber }

#[derive(DeriveIden)]
enum Team { Table, Id }
