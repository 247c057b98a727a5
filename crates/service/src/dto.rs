//! Flat transfer records exchanged over the API.
//!
//! Parent entities appear only as a foreign key plus a display name, so
//! serialising a record never walks back through a team or driver.

use chrono::NaiveDateTime;
use models::{driver, errors::ModelError, lap_time, team, timestamp};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    pub id: i32,
    pub name: String,
    pub principal: String,
    pub has_logo: bool,
    pub drivers: Vec<DriverDto>,
}

impl TeamDto {
    /// Each driver gets this team's name back-filled.
    pub fn from_model(team: team::Model, drivers: Vec<driver::Model>) -> Self {
        let drivers = drivers.into_iter().map(|d| DriverDto::new(d, team.name.clone())).collect();
        Self { id: team.id, has_logo: team.logo.is_some(), name: team.name, principal: team.principal, drivers }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDto {
    pub id: i32,
    pub team_id: i32,
    pub name: String,
    pub car_number: i32,
    pub team_name: String,
}

impl DriverDto {
    pub fn new(driver: driver::Model, team_name: impl Into<String>) -> Self {
        Self {
            id: driver.id,
            team_id: driver.team_id,
            name: driver.name,
            car_number: driver.car_number,
            team_name: team_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapTimeDto {
    pub id: i32,
    pub driver_id: i32,
    pub start_time: NaiveDateTime,
    pub sector1: Option<f64>,
    pub sector2: Option<f64>,
    pub sector3: Option<f64>,
    /// Present only when all three sectors are recorded.
    pub total_lap_time: Option<f64>,
    pub driver_name: String,
    pub team_name: String,
}

impl LapTimeDto {
    pub fn new(lap: lap_time::Model, driver_name: impl Into<String>, team_name: impl Into<String>) -> Self {
        Self {
            total_lap_time: lap.total_lap_time(),
            id: lap.id,
            driver_id: lap.driver_id,
            start_time: lap.start_time,
            sector1: lap.sector1,
            sector2: lap.sector2,
            sector3: lap.sector3,
            driver_name: driver_name.into(),
            team_name: team_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInput {
    pub name: String,
    pub principal: String,
}

impl TeamInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        team::validate_name(&self.name)?;
        team::validate_principal(&self.principal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInput {
    pub team_id: i32,
    pub name: String,
    pub car_number: i32,
}

impl DriverInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        driver::validate_name(&self.name)?;
        driver::validate_car_number(self.car_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapTimeInput {
    pub driver_id: i32,
    #[serde(deserialize_with = "de_start_time")]
    pub start_time: NaiveDateTime,
    #[serde(default)]
    pub sector1: Option<f64>,
    #[serde(default)]
    pub sector2: Option<f64>,
    #[serde(default)]
    pub sector3: Option<f64>,
}

impl LapTimeInput {
    pub fn sectors(&self) -> lap_time::Sectors {
        lap_time::Sectors { sector1: self.sector1, sector2: self.sector2, sector3: self.sector3 }
    }
}

fn de_start_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    timestamp::parse_start_time(&raw).map_err(serde::de::Error::custom)
}
