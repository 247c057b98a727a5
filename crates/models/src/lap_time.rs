use sea_orm::{entity::prelude::*, sea_query::ForeignKeyAction, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::driver;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lap_time")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub driver_id: i32,
    pub start_time: DateTime,
    pub sector1: Option<f64>,
    pub sector2: Option<f64>,
    pub sector3: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Driver }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Driver => Entity::belongs_to(driver::Entity)
                .from(Column::DriverId)
                .to(driver::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<driver::Entity> for Entity {
    fn to() -> RelationDef { Relation::Driver.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn sectors(&self) -> Sectors {
        Sectors { sector1: self.sector1, sector2: self.sector2, sector3: self.sector3 }
    }

    pub fn total_lap_time(&self) -> Option<f64> { self.sectors().total() }
}

/// The three timed segments of a lap, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sectors {
    pub sector1: Option<f64>,
    pub sector2: Option<f64>,
    pub sector3: Option<f64>,
}

impl Sectors {
    pub fn total(&self) -> Option<f64> { total_lap_time(self.sector1, self.sector2, self.sector3) }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_sector("sector1", self.sector1)?;
        validate_sector("sector2", self.sector2)?;
        validate_sector("sector3", self.sector3)
    }
}

/// Sum of the three sectors; `None` unless all three are recorded.
pub fn total_lap_time(sector1: Option<f64>, sector2: Option<f64>, sector3: Option<f64>) -> Option<f64> {
    Some(sector1? + sector2? + sector3?)
}

pub fn validate_sector(field: &'static str, value: Option<f64>) -> Result<(), ModelError> {
    match value {
        Some(v) if !v.is_finite() => Err(ModelError::invalid(field, "must be a finite number of seconds")),
        Some(v) if v < 0.0 => Err(ModelError::invalid(field, "must not be negative")),
        _ => Ok(()),
    }
}

pub async fn create(db: &DatabaseConnection, driver_id: i32, start_time: DateTime, sectors: Sectors) -> Result<Model, ModelError> {
    sectors.validate()?;
    let am = ActiveModel {
        id: NotSet,
        driver_id: Set(driver_id),
        start_time: Set(start_time),
        sector1: Set(sectors.sector1),
        sector2: Set(sectors.sector2),
        sector3: Set(sectors.sector3),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_complete_sectors() {
        assert_eq!(total_lap_time(Some(30.0), Some(28.5), Some(32.25)), Some(90.75));
    }

    #[test]
    fn total_is_absent_when_any_sector_missing() {
        assert_eq!(total_lap_time(None, Some(28.5), Some(32.25)), None);
        assert_eq!(total_lap_time(Some(30.0), None, Some(32.25)), None);
        assert_eq!(total_lap_time(Some(30.0), Some(28.5), None), None);
        assert_eq!(total_lap_time(None, None, None), None);
    }

    #[test]
    fn total_follows_current_sector_values() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(14, 3, 0).unwrap();
        let mut lap = Model { id: 1, driver_id: 1, start_time: start, sector1: Some(30.0), sector2: Some(28.5), sector3: None };
        assert_eq!(lap.total_lap_time(), None);
        lap.sector3 = Some(32.25);
        assert_eq!(lap.total_lap_time(), Some(90.75));
        lap.sector1 = Some(29.0);
        assert_eq!(lap.total_lap_time(), Some(89.75));
    }

    #[test]
    fn sectors_reject_negative_and_non_finite() {
        assert!(validate_sector("sector1", Some(-0.1)).is_err());
        assert!(validate_sector("sector2", Some(f64::NAN)).is_err());
        assert!(validate_sector("sector3", Some(f64::INFINITY)).is_err());
        assert!(validate_sector("sector1", Some(0.0)).is_ok());
        assert!(validate_sector("sector1", None).is_ok());

        let err = Sectors { sector1: Some(1.0), sector2: Some(-2.0), sector3: None }.validate().unwrap_err();
        assert!(err.to_string().starts_with("sector2:"));
    }
}
