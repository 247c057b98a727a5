use std::path::Path;

use axum::{routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod teams;
pub mod drivers;
pub mod lap_times;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: resources, health and the static UI.
pub fn build_router(state: AppState, cors: CorsLayer, static_dir: &str) -> Router {
    let index = Path::new(static_dir).join("index.html");
    let assets = ServeDir::new(static_dir).fallback(ServeFile::new(index));

    let teams = Router::new()
        .route("/teams", get(teams::list).post(teams::create))
        .route("/teams/:id", get(teams::get).put(teams::update).delete(teams::delete))
        .route("/teams/:id/logo", get(teams::get_logo).put(teams::put_logo).delete(teams::delete_logo));

    let drivers = Router::new()
        .route("/drivers", get(drivers::list).post(drivers::create))
        .route("/drivers/:id", get(drivers::get).put(drivers::update).delete(drivers::delete))
        .route("/drivers/team/:team_id", get(drivers::list_by_team));

    let lap_times = Router::new()
        .route("/laptimes", get(lap_times::list).post(lap_times::create))
        .route("/laptimes/fastest", get(lap_times::fastest))
        .route("/laptimes/:id", get(lap_times::get).put(lap_times::update).delete(lap_times::delete))
        .route("/laptimes/driver/:driver_id", get(lap_times::list_by_driver));

    Router::new()
        .route("/health", get(health))
        .merge(teams)
        .merge(drivers)
        .merge(lap_times)
        .with_state(state)
        .fallback_service(assets)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
