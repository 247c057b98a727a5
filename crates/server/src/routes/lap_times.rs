use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use service::dto::{LapTimeDto, LapTimeInput};
use service::lap_time_service::{self, FASTEST_DEFAULT};

use crate::errors::{ApiJson, ApiPath, ApiQuery, JsonApiError};
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FastestQuery {
    pub count: Option<i64>,
}

impl FastestQuery {
    /// Requested leaderboard size, defaulting when absent.
    pub fn resolve(&self) -> Result<u64, JsonApiError> {
        match self.count {
            None => Ok(FASTEST_DEFAULT),
            Some(n) => lap_time_service::validate_fastest_count(n).map_err(|e| JsonApiError::from_service(e, "fastest_lap_times")),
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<LapTimeDto>>, JsonApiError> {
    let laps = lap_time_service::list_lap_times(&state.db).await.map_err(|e| JsonApiError::from_service(e, "list_lap_times"))?;
    Ok(Json(laps))
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<Json<LapTimeDto>, JsonApiError> {
    lap_time_service::get_lap_time(&state.db, id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "get_lap_time"))?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("lap time with id {id} not found")))
}

/// Unknown drivers yield an empty list rather than 404.
pub async fn list_by_driver(State(state): State<AppState>, ApiPath(driver_id): ApiPath<i32>) -> Result<Json<Vec<LapTimeDto>>, JsonApiError> {
    let laps = lap_time_service::list_lap_times_by_driver(&state.db, driver_id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "list_lap_times_by_driver"))?;
    Ok(Json(laps))
}

pub async fn fastest(State(state): State<AppState>, ApiQuery(q): ApiQuery<FastestQuery>) -> Result<Json<Vec<LapTimeDto>>, JsonApiError> {
    let count = q.resolve()?;
    let laps = lap_time_service::fastest_lap_times(&state.db, count)
        .await
        .map_err(|e| JsonApiError::from_service(e, "fastest_lap_times"))?;
    info!(count, returned = laps.len(), "fastest lap times");
    Ok(Json(laps))
}

pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<LapTimeInput>) -> Result<Response, JsonApiError> {
    let created = lap_time_service::create_lap_time(&state.db, &input)
        .await
        .map_err(|e| JsonApiError::from_service(e, "create_lap_time"))?;
    let location = format!("/laptimes/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<LapTimeInput>,
) -> Result<Json<LapTimeDto>, JsonApiError> {
    let updated = lap_time_service::update_lap_time(&state.db, id, &input)
        .await
        .map_err(|e| JsonApiError::from_service(e, "update_lap_time"))?;
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    match lap_time_service::delete_lap_time(&state.db, id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(JsonApiError::not_found(format!("lap time with id {id} not found"))),
        Err(e) => Err(JsonApiError::from_service(e, "delete_lap_time")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_to_ten() {
        assert_eq!(FastestQuery::default().resolve().unwrap(), 10);
    }

    #[test]
    fn count_range_is_enforced() {
        assert_eq!(FastestQuery { count: Some(1) }.resolve().unwrap(), 1);
        assert_eq!(FastestQuery { count: Some(100) }.resolve().unwrap(), 100);
        for bad in [0, 101, -1] {
            let err = FastestQuery { count: Some(bad) }.resolve().unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.body.field.as_deref(), Some("count"));
        }
    }
}
