use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use service::driver_service;
use service::dto::{DriverDto, DriverInput};

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::routes::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<DriverDto>>, JsonApiError> {
    let drivers = driver_service::list_drivers(&state.db).await.map_err(|e| JsonApiError::from_service(e, "list_drivers"))?;
    Ok(Json(drivers))
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<Json<DriverDto>, JsonApiError> {
    driver_service::get_driver(&state.db, id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "get_driver"))?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("driver with id {id} not found")))
}

/// Unknown teams yield an empty list rather than 404.
pub async fn list_by_team(State(state): State<AppState>, ApiPath(team_id): ApiPath<i32>) -> Result<Json<Vec<DriverDto>>, JsonApiError> {
    let drivers = driver_service::list_drivers_by_team(&state.db, team_id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "list_drivers_by_team"))?;
    Ok(Json(drivers))
}

pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<DriverInput>) -> Result<Response, JsonApiError> {
    let created = driver_service::create_driver(&state.db, &input).await.map_err(|e| JsonApiError::from_service(e, "create_driver"))?;
    let location = format!("/drivers/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<DriverInput>,
) -> Result<Json<DriverDto>, JsonApiError> {
    let updated = driver_service::update_driver(&state.db, id, &input)
        .await
        .map_err(|e| JsonApiError::from_service(e, "update_driver"))?;
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    match driver_service::delete_driver(&state.db, id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(JsonApiError::not_found(format!("driver with id {id} not found"))),
        Err(e) => Err(JsonApiError::from_service(e, "delete_driver")),
    }
}
