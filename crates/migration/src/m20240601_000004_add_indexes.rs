//! Add indexes on the foreign-key columns used by the by-parent listings.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_driver_team_id")
                    .table(Driver::Table)
                    .col(Driver::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lap_time_driver_id")
                    .table(LapTime::Table)
                    .col(LapTime::DriverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_lap_time_driver_id").table(LapTime::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_driver_team_id").table(Driver::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Driver { Table, TeamId }

#[derive(DeriveIden)]
enum LapTime { Table, DriverId }
