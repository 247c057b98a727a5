use std::ops::RangeInclusive;

use sea_orm::{entity::prelude::*, sea_query::ForeignKeyAction, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{lap_time, team};

pub const CAR_NUMBERS: RangeInclusive<i32> = 1..=99;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "driver")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub team_id: i32,
    pub name: String,
    pub car_number: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Team, LapTime }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Team => Entity::belongs_to(team::Entity)
                .from(Column::TeamId)
                .to(team::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::LapTime => Entity::has_many(lap_time::Entity).into(),
        }
    }
}

impl Related<team::Entity> for Entity {
    fn to() -> RelationDef { Relation::Team.def() }
}

impl Related<lap_time::Entity> for Entity {
    fn to() -> RelationDef { Relation::LapTime.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> { team::validate_label("name", name) }

/// Car numbers are not unique across teams; only the range is enforced.
pub fn validate_car_number(car_number: i32) -> Result<(), ModelError> {
    if !CAR_NUMBERS.contains(&car_number) {
        return Err(ModelError::invalid(
            "carNumber",
            format!("must be between {} and {}", CAR_NUMBERS.start(), CAR_NUMBERS.end()),
        ));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, team_id: i32, name: &str, car_number: i32) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_car_number(car_number)?;
    let am = ActiveModel {
        id: NotSet,
        team_id: Set(team_id),
        name: Set(name.trim().to_string()),
        car_number: Set(car_number),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
