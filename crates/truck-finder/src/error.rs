use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::trucks::{SearchError, UpstreamError, ValidationError};
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Query(QueryRejection),
    Search(SearchError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Search(SearchError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Search(SearchError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            AppError::Query(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Query(err) => write!(f, "{}", err.body_text()),
            AppError::Search(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Query(err) => Some(err),
            AppError::Search(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        Self::Query(value)
    }
}

impl From<SearchError> for AppError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Search(SearchError::Validation(value))
    }
}

impl From<UpstreamError> for AppError {
    fn from(value: UpstreamError) -> Self {
        Self::Search(SearchError::Upstream(value))
    }
}
