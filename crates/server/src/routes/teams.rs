use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use service::dto::{TeamDto, TeamInput};
use service::team_service;

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::routes::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TeamDto>>, JsonApiError> {
    let teams = team_service::list_teams(&state.db).await.map_err(|e| JsonApiError::from_service(e, "list_teams"))?;
    Ok(Json(teams))
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<Json<TeamDto>, JsonApiError> {
    team_service::get_team(&state.db, id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "get_team"))?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found(format!("team with id {id} not found")))
}

pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<TeamInput>) -> Result<Response, JsonApiError> {
    let created = team_service::create_team(&state.db, &input).await.map_err(|e| JsonApiError::from_service(e, "create_team"))?;
    let location = format!("/teams/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<TeamInput>,
) -> Result<Json<TeamDto>, JsonApiError> {
    let updated = team_service::update_team(&state.db, id, &input).await.map_err(|e| JsonApiError::from_service(e, "update_team"))?;
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    match team_service::delete_team(&state.db, id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(JsonApiError::not_found(format!("team with id {id} not found"))),
        Err(e) => Err(JsonApiError::from_service(e, "delete_team")),
    }
}

pub async fn get_logo(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<Response, JsonApiError> {
    let logo = team_service::get_team_logo(&state.db, id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "get_team_logo"))?
        .ok_or_else(|| JsonApiError::not_found(format!("team {id} has no logo")))?;
    Ok(([(header::CONTENT_TYPE, sniff_image_type(&logo))], logo).into_response())
}

pub async fn put_logo(State(state): State<AppState>, ApiPath(id): ApiPath<i32>, body: Bytes) -> Result<StatusCode, JsonApiError> {
    let size = body.len();
    team_service::set_team_logo(&state.db, id, body.to_vec())
        .await
        .map_err(|e| JsonApiError::from_service(e, "set_team_logo"))?;
    info!(team_id = id, bytes = size, "team logo stored");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_logo(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    team_service::clear_team_logo(&state.db, id).await.map_err(|e| JsonApiError::from_service(e, "clear_team_logo"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Content type from the leading magic bytes; unknown data is served as octet-stream.
pub fn sniff_image_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if looks_like_svg(bytes) {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start();
    (head.starts_with("<svg") || head.starts_with("<?xml")) && head.contains("<svg")
}
