use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Body of every non-2xx API response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Message returned for any store or internal failure; details stay in the log.
pub const INTERNAL_MESSAGE: &str = "An error occurred while processing your request";

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { error, message: message.into(), field: None } }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "bad_request", message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, "not_found", message) }

    pub fn internal() -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", INTERNAL_MESSAGE) }

    pub fn with_field(mut self, field: Option<&str>) -> Self {
        self.body.field = field.map(str::to_owned);
        self
    }

    /// Map a service failure for operation `op`; store failures are logged and masked.
    pub fn from_service(e: ServiceError, op: &'static str) -> Self {
        match e {
            ref v if v.is_validation() => {
                warn!(op, err = %v, "rejected input");
                let field = v.field();
                Self::bad_request(v.to_string()).with_field(field)
            }
            ServiceError::NotFound(msg) => Self::not_found(msg),
            other => {
                error!(op, err = %other, "request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let field = match rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&text),
            _ => None,
        };
        Self::bad_request(text).with_field(field.as_deref())
    }
}

/// Field named by a body deserialisation error, either as a missing field or
/// as the path prefix of the failure.
fn rejected_field(text: &str) -> Option<String> {
    if let Some((_, rest)) = text.split_once("missing field `") {
        return rest.split_once('`').map(|(name, _)| name.to_string());
    }
    let detail = text.split_once("target type: ").map_or(text, |(_, d)| d);
    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path != "."
        && path.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

/// `Json` whose rejections are reported as 400 with an [`ErrorBody`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(JsonApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(JsonApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(JsonApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
