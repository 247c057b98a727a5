use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{BinOper, Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, Order, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use tracing::{info, instrument};

use crate::dto::{LapTimeDto, LapTimeInput};
use crate::errors::ServiceError;
use models::{driver, lap_time, team};

/// Largest `count` accepted by [`fastest_lap_times`] callers.
pub const FASTEST_MAX: u64 = 100;
pub const FASTEST_DEFAULT: u64 = 10;

/// Lap columns plus the joined driver and team names.
#[derive(Debug, FromQueryResult)]
struct LapTimeRow {
    id: i32,
    driver_id: i32,
    start_time: NaiveDateTime,
    sector1: Option<f64>,
    sector2: Option<f64>,
    sector3: Option<f64>,
    driver_name: Option<String>,
    team_name: Option<String>,
}

impl From<LapTimeRow> for LapTimeDto {
    fn from(row: LapTimeRow) -> Self {
        let lap = lap_time::Model {
            id: row.id,
            driver_id: row.driver_id,
            start_time: row.start_time,
            sector1: row.sector1,
            sector2: row.sector2,
            sector3: row.sector3,
        };
        LapTimeDto::new(lap, row.driver_name.unwrap_or_default(), row.team_name.unwrap_or_default())
    }
}

fn with_names() -> Select<lap_time::Entity> {
    lap_time::Entity::find()
        .join(JoinType::LeftJoin, lap_time::Relation::Driver.def())
        .join(JoinType::LeftJoin, driver::Relation::Team.def())
        .column_as(driver::Column::Name, "driver_name")
        .column_as(team::Column::Name, "team_name")
}

/// `sector1 + sector2 + sector3`, evaluated by the store.
fn sector_sum() -> SimpleExpr {
    let col = |c: lap_time::Column| -> SimpleExpr { Expr::col((lap_time::Entity, c)).into() };
    let first_two = SimpleExpr::Binary(
        Box::new(col(lap_time::Column::Sector1)),
        BinOper::Add,
        Box::new(col(lap_time::Column::Sector2)),
    );
    SimpleExpr::Binary(Box::new(first_two), BinOper::Add, Box::new(col(lap_time::Column::Sector3)))
}

/// Check a requested leaderboard size against `1..=FASTEST_MAX`.
pub fn validate_fastest_count(count: i64) -> Result<u64, ServiceError> {
    match u64::try_from(count) {
        Ok(n) if (1..=FASTEST_MAX).contains(&n) => Ok(n),
        _ => Err(ServiceError::invalid("count", format!("must be between 1 and {FASTEST_MAX}"))),
    }
}

pub async fn list_lap_times(db: &DatabaseConnection) -> Result<Vec<LapTimeDto>, ServiceError> {
    let rows = with_names().order_by_asc(lap_time::Column::Id).into_model::<LapTimeRow>().all(db).await?;
    Ok(rows.into_iter().map(LapTimeDto::from).collect())
}

pub async fn get_lap_time(db: &DatabaseConnection, id: i32) -> Result<Option<LapTimeDto>, ServiceError> {
    let row = with_names().filter(lap_time::Column::Id.eq(id)).into_model::<LapTimeRow>().one(db).await?;
    Ok(row.map(LapTimeDto::from))
}

/// Empty for an unknown driver.
pub async fn list_lap_times_by_driver(db: &DatabaseConnection, driver_id: i32) -> Result<Vec<LapTimeDto>, ServiceError> {
    let rows = with_names()
        .filter(lap_time::Column::DriverId.eq(driver_id))
        .order_by_asc(lap_time::Column::Id)
        .into_model::<LapTimeRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(LapTimeDto::from).collect())
}

/// Up to `count` laps with all three sectors recorded, quickest first.
/// Equal totals fall back to ascending id.
pub async fn fastest_lap_times(db: &DatabaseConnection, count: u64) -> Result<Vec<LapTimeDto>, ServiceError> {
    let rows = with_names()
        .filter(lap_time::Column::Sector1.is_not_null())
        .filter(lap_time::Column::Sector2.is_not_null())
        .filter(lap_time::Column::Sector3.is_not_null())
        .order_by(sector_sum(), Order::Asc)
        .order_by_asc(lap_time::Column::Id)
        .limit(count)
        .into_model::<LapTimeRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(LapTimeDto::from).collect())
}

#[instrument(skip(db, input), fields(driver_id = input.driver_id))]
pub async fn create_lap_time(db: &DatabaseConnection, input: &LapTimeInput) -> Result<LapTimeDto, ServiceError> {
    input.sectors().validate()?;
    let (driver_name, team_name) = existing_driver(db, input.driver_id).await?;
    let created = lap_time::create(db, input.driver_id, input.start_time, input.sectors()).await?;
    info!(lap_time_id = created.id, total = ?created.total_lap_time(), "lap time recorded");
    Ok(LapTimeDto::new(created, driver_name, team_name))
}

#[instrument(skip(db, input))]
pub async fn update_lap_time(db: &DatabaseConnection, id: i32, input: &LapTimeInput) -> Result<LapTimeDto, ServiceError> {
    input.sectors().validate()?;
    let mut am: lap_time::ActiveModel = lap_time::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("lap time", id))?
        .into();
    let (driver_name, team_name) = existing_driver(db, input.driver_id).await?;
    am.driver_id = Set(input.driver_id);
    am.start_time = Set(input.start_time);
    am.sector1 = Set(input.sector1);
    am.sector2 = Set(input.sector2);
    am.sector3 = Set(input.sector3);
    let updated = am.update(db).await?;
    info!(lap_time_id = id, "lap time updated");
    Ok(LapTimeDto::new(updated, driver_name, team_name))
}

#[instrument(skip(db))]
pub async fn delete_lap_time(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = lap_time::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected > 0 {
        info!(lap_time_id = id, "lap time deleted");
    }
    Ok(res.rows_affected > 0)
}

/// Driver name and team name for an existing driver.
async fn existing_driver(db: &DatabaseConnection, driver_id: i32) -> Result<(String, String), ServiceError> {
    let (found, owner) = driver::Entity::find_by_id(driver_id)
        .find_also_related(team::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::invalid("driverId", format!("driver {driver_id} does not exist")))?;
    Ok((found.name, owner.map(|t| t.name).unwrap_or_default()))
}
