//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_team;
mod m20240601_000002_create_driver;
mod m20240601_000003_create_lap_time;
mod m20240601_000004_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_team::Migration),
            Box::new(m20240601_000002_create_driver::Migration),
            Box::new(m20240601_000003_create_lap_time::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000004_add_indexes::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, Statement};

    #[tokio::test]
    async fn up_and_down_on_sqlite() -> Result<(), DbErr> {
        // One pooled connection so every statement sees the same in-memory database.
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1);
        let db = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;

        let rows = db
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name".to_owned(),
            ))
            .await?;
        let tables: Vec<String> = rows
            .iter()
            .filter_map(|r| r.try_get::<String>("", "name").ok())
            .collect();
        for t in ["driver", "lap_time", "team"] {
            assert!(tables.iter().any(|n| n == t), "missing table {t}: {tables:?}");
        }

        Migrator::down(&db, None).await?;
        let rows = db
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('team', 'driver', 'lap_time')".to_owned(),
            ))
            .await?;
        assert!(rows.is_empty());
        Ok(())
    }
}
