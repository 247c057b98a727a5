use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::driver;
use crate::errors::ModelError;

/// Upper bound, in characters, for every free-text label.
pub const LABEL_MAX_CHARS: usize = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub principal: String,
    #[serde(skip)]
    pub logo: Option<Vec<u8>>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Driver }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Driver => Entity::has_many(driver::Entity).into() }
    }
}

impl Related<driver::Entity> for Entity {
    fn to() -> RelationDef { Relation::Driver.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Non-empty after trimming and at most [`LABEL_MAX_CHARS`] characters.
pub fn validate_label(field: &'static str, value: &str) -> Result<(), ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::invalid(field, "must not be empty"));
    }
    if trimmed.chars().count() > LABEL_MAX_CHARS {
        return Err(ModelError::invalid(field, format!("must be at most {LABEL_MAX_CHARS} characters")));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> { validate_label("name", name) }

pub fn validate_principal(principal: &str) -> Result<(), ModelError> { validate_label("principal", principal) }

pub async fn create(db: &DatabaseConnection, name: &str, principal: &str) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_principal(principal)?;
    let am = ActiveModel {
        id: NotSet,
        name: Set(name.trim().to_string()),
        principal: Set(principal.trim().to_string()),
        logo: Set(None),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
