use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use tracing::{info, instrument};

use crate::dto::{DriverDto, DriverInput};
use crate::errors::ServiceError;
use models::{driver, team};

/// Driver columns plus the joined team name.
#[derive(Debug, FromQueryResult)]
struct DriverRow {
    id: i32,
    team_id: i32,
    name: String,
    car_number: i32,
    team_name: Option<String>,
}

impl From<DriverRow> for DriverDto {
    fn from(row: DriverRow) -> Self {
        DriverDto {
            id: row.id,
            team_id: row.team_id,
            name: row.name,
            car_number: row.car_number,
            team_name: row.team_name.unwrap_or_default(),
        }
    }
}

fn with_team_name() -> Select<driver::Entity> {
    driver::Entity::find()
        .join(JoinType::LeftJoin, driver::Relation::Team.def())
        .column_as(team::Column::Name, "team_name")
        .order_by_asc(driver::Column::Id)
}

pub async fn list_drivers(db: &DatabaseConnection) -> Result<Vec<DriverDto>, ServiceError> {
    let rows = with_team_name().into_model::<DriverRow>().all(db).await?;
    Ok(rows.into_iter().map(DriverDto::from).collect())
}

pub async fn get_driver(db: &DatabaseConnection, id: i32) -> Result<Option<DriverDto>, ServiceError> {
    let row = with_team_name().filter(driver::Column::Id.eq(id)).into_model::<DriverRow>().one(db).await?;
    Ok(row.map(DriverDto::from))
}

/// Empty for an unknown team.
pub async fn list_drivers_by_team(db: &DatabaseConnection, team_id: i32) -> Result<Vec<DriverDto>, ServiceError> {
    let rows = with_team_name()
        .filter(driver::Column::TeamId.eq(team_id))
        .into_model::<DriverRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(DriverDto::from).collect())
}

#[instrument(skip(db, input), fields(team_id = input.team_id))]
pub async fn create_driver(db: &DatabaseConnection, input: &DriverInput) -> Result<DriverDto, ServiceError> {
    input.validate()?;
    let owner = existing_team(db, input.team_id).await?;
    let created = driver::create(db, input.team_id, &input.name, input.car_number).await?;
    info!(driver_id = created.id, "driver created");
    Ok(DriverDto::new(created, owner.name))
}

/// Full replacement; a moved driver reports its new team's name.
#[instrument(skip(db, input))]
pub async fn update_driver(db: &DatabaseConnection, id: i32, input: &DriverInput) -> Result<DriverDto, ServiceError> {
    input.validate()?;
    let mut am: driver::ActiveModel = driver::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("driver", id))?
        .into();
    let owner = existing_team(db, input.team_id).await?;
    am.team_id = Set(input.team_id);
    am.name = Set(input.name.trim().to_string());
    am.car_number = Set(input.car_number);
    let updated = am.update(db).await?;
    info!(driver_id = id, "driver updated");
    Ok(DriverDto::new(updated, owner.name))
}

/// Lap times go with the driver.
#[instrument(skip(db))]
pub async fn delete_driver(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = driver::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected > 0 {
        info!(driver_id = id, "driver deleted");
    }
    Ok(res.rows_affected > 0)
}

/// A dangling `teamId` is a client error, not a store failure.
async fn existing_team(db: &DatabaseConnection, team_id: i32) -> Result<team::Model, ServiceError> {
    team::Entity::find_by_id(team_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::invalid("teamId", format!("team {team_id} does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::lap_time;
    use sea_orm::PaginatorTrait;

    fn input(team_id: i32, name: &str, car_number: i32) -> DriverInput {
        DriverInput { team_id, name: name.into(), car_number }
    }

    #[tokio::test]
    async fn driver_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let red = team::create(&db, "Red", "Chris").await?;

        let d = create_driver(&db, &input(red.id, "Ann", 44)).await?;
        assert_eq!(d.team_name, "Red");
        assert_eq!(d.car_number, 44);

        let found = get_driver(&db, d.id).await?.unwrap();
        assert_eq!(found, d);

        let updated = update_driver(&db, d.id, &input(red.id, "Ann B", 45)).await?;
        assert_eq!(updated.name, "Ann B");
        assert_eq!(updated.car_number, 45);

        assert!(delete_driver(&db, d.id).await?);
        assert!(get_driver(&db, d.id).await?.is_none());
        assert!(!delete_driver(&db, d.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn car_number_bounds() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let red = team::create(&db, "Red", "Chris").await?;

        for ok in [1, 99] {
            assert_eq!(create_driver(&db, &input(red.id, "Ok", ok)).await?.car_number, ok);
        }
        for bad in [0, 100, -5] {
            let err = create_driver(&db, &input(red.id, "Bad", bad)).await.unwrap_err();
            assert_eq!(err.field(), Some("carNumber"));
        }
        assert_eq!(driver::Entity::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_team_is_a_validation_error() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let err = create_driver(&db, &input(12, "Ann", 7)).await.unwrap_err();
        assert_eq!(err.field(), Some("teamId"));
        assert_eq!(driver::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_driver_changes_nothing() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let red = team::create(&db, "Red", "Chris").await?;
        let d = create_driver(&db, &input(red.id, "Ann", 7)).await?;

        let err = update_driver(&db, d.id + 100, &input(red.id, "Ghost", 9)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(list_drivers(&db).await?, vec![d]);
        Ok(())
    }

    #[tokio::test]
    async fn moving_driver_reports_new_team() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let red = team::create(&db, "Red", "Chris").await?;
        let blue = team::create(&db, "Blue", "Toto").await?;
        let d = create_driver(&db, &input(red.id, "Ann", 7)).await?;

        let moved = update_driver(&db, d.id, &input(blue.id, "Ann", 7)).await?;
        assert_eq!(moved.team_id, blue.id);
        assert_eq!(moved.team_name, "Blue");
        assert!(list_drivers_by_team(&db, red.id).await?.is_empty());
        assert_eq!(list_drivers_by_team(&db, blue.id).await?.len(), 1);

        let err = update_driver(&db, d.id, &input(blue.id + 50, "Ann", 7)).await.unwrap_err();
        assert_eq!(err.field(), Some("teamId"));
        assert_eq!(get_driver(&db, d.id).await?.unwrap().team_id, blue.id);
        Ok(())
    }

    #[tokio::test]
    async fn list_is_ordered_and_joined() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let red = team::create(&db, "Red", "Chris").await?;
        let blue = team::create(&db, "Blue", "Toto").await?;
        create_driver(&db, &input(blue.id, "Bob", 2)).await?;
        create_driver(&db, &input(red.id, "Ann", 1)).await?;

        let all = list_drivers(&db).await?;
        let got: Vec<_> = all.iter().map(|d| (d.name.as_str(), d.team_name.as_str())).collect();
        assert_eq!(got, vec![("Bob", "Blue"), ("Ann", "Red")]);
        assert!(list_drivers_by_team(&db, 999).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_to_lap_times() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let red = team::create(&db, "Red", "Chris").await?;
        let d = create_driver(&db, &input(red.id, "Ann", 7)).await?;
        let start = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        lap_time::create(&db, d.id, start, lap_time::Sectors::default()).await?;

        assert!(delete_driver(&db, d.id).await?);
        assert_eq!(lap_time::Entity::find().count(&db).await?, 0);
        assert_eq!(team::Entity::find().count(&db).await?, 1);
        Ok(())
    }
}
