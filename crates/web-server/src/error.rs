use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashboard::DashboardError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),
    #[error("Metric error: {0}")]
    Metric(#[from] analytics::MetricError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// A malformed or incomplete query string is the caller's mistake.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Errors caused by the request's inputs carry their message back to the
/// browser so it can be shown next to the widget that caused it.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Dashboard(
                err @ (DashboardError::Metric(_) | DashboardError::InvalidFilter(_)),
            ) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Dashboard(err) => {
                tracing::error!(error = ?err, "Dashboard error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while rendering the dashboard".to_string(),
                )
            }
            AppError::Metric(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
