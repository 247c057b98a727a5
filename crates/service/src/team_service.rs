use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{info, instrument};

use crate::dto::{TeamDto, TeamInput};
use crate::errors::ServiceError;
use models::{driver, team};

/// All teams with their drivers, ascending by id.
pub async fn list_teams(db: &DatabaseConnection) -> Result<Vec<TeamDto>, ServiceError> {
    let rows = team::Entity::find()
        .order_by_asc(team::Column::Id)
        .find_with_related(driver::Entity)
        .order_by_asc(driver::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(t, drivers)| TeamDto::from_model(t, drivers)).collect())
}

pub async fn get_team(db: &DatabaseConnection, id: i32) -> Result<Option<TeamDto>, ServiceError> {
    let Some(found) = team::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let drivers = found.find_related(driver::Entity).order_by_asc(driver::Column::Id).all(db).await?;
    Ok(Some(TeamDto::from_model(found, drivers)))
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_team(db: &DatabaseConnection, input: &TeamInput) -> Result<TeamDto, ServiceError> {
    let created = team::create(db, &input.name, &input.principal).await?;
    info!(team_id = created.id, "team created");
    Ok(TeamDto::from_model(created, Vec::new()))
}

/// Replace name and principal; the returned record lists the team's current drivers.
#[instrument(skip(db, input))]
pub async fn update_team(db: &DatabaseConnection, id: i32, input: &TeamInput) -> Result<TeamDto, ServiceError> {
    input.validate()?;
    let mut am: team::ActiveModel = team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("team", id))?
        .into();
    am.name = Set(input.name.trim().to_string());
    am.principal = Set(input.principal.trim().to_string());
    let updated = am.update(db).await?;
    let drivers = updated.find_related(driver::Entity).order_by_asc(driver::Column::Id).all(db).await?;
    info!(team_id = id, "team updated");
    Ok(TeamDto::from_model(updated, drivers))
}

/// Drivers and their lap times go with the team.
#[instrument(skip(db))]
pub async fn delete_team(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = team::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected > 0 {
        info!(team_id = id, "team deleted");
    }
    Ok(res.rows_affected > 0)
}

/// `NotFound` for an unknown team; `Ok(None)` when the team has no logo.
pub async fn get_team_logo(db: &DatabaseConnection, id: i32) -> Result<Option<Vec<u8>>, ServiceError> {
    let found = team::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("team", id))?;
    Ok(found.logo)
}

#[instrument(skip(db, logo), fields(bytes = logo.len()))]
pub async fn set_team_logo(db: &DatabaseConnection, id: i32, logo: Vec<u8>) -> Result<(), ServiceError> {
    if logo.is_empty() {
        return Err(ServiceError::invalid("logo", "must not be empty"));
    }
    write_logo(db, id, Some(logo)).await
}

#[instrument(skip(db))]
pub async fn clear_team_logo(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    write_logo(db, id, None).await
}

async fn write_logo(db: &DatabaseConnection, id: i32, logo: Option<Vec<u8>>) -> Result<(), ServiceError> {
    let res = team::Entity::update_many()
        .col_expr(team::Column::Logo, Expr::value(logo))
        .filter(team::Column::Id.eq(id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("team", id));
    }
    Ok(())
}
