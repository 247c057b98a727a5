//! Create `lap_time` table with FK to `driver`.
//!
//! Sector columns are nullable; the lap total is derived on read and has no column.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LapTime::Table)
                    .if_not_exists()
                    .col(pk_auto(LapTime::Id))
                    .col(integer(LapTime::DriverId).not_null())
                    .col(date_time(LapTime::StartTime).not_null())
                    .col(ColumnDef::new(LapTime::Sector1).double().null())
                    .col(ColumnDef::new(LapTime::Sector2).double().null())
                    .col(ColumnDef::new(LapTime::Sector3).double().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lap_time_driver")
                            .from(LapTime::Table, LapTime::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LapTime::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LapTime { Table, Id, DriverId, StartTime, Sector1, Sector2, Sector3 }

#[derive(DeriveIden)]
enum Driver { Table, Id }
