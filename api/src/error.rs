use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use food_trucks::{GeocodeError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Food truck not found")]
    NotFound,

    #[error("Food truck {0} already exists")]
    Conflict(i64),

    #[error("Payload location_id {payload} does not match path id {path}")]
    IdMismatch { path: i64, payload: i64 },

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Address not found")]
    AddressNotFound,

    #[error(transparent)]
    Geocoding(#[from] GeocodeError),

    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error("Something went wrong: {0}")]
    ServerError(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let code = self.error_code();

        if code.is_server_error() {
            tracing::error!(error = %self, status = code.as_u16(), "request failed");
        }

        (code, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}

impl AppError {
    fn error_code(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::AddressNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::IdMismatch { .. } | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Geocoding(GeocodeError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Geocoding(_) => StatusCode::BAD_GATEWAY,
            AppError::Rejected(status, _) => *status,
            AppError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Upstream and storage causes stay in the logs.
    fn detail(&self) -> String {
        match self {
            AppError::Geocoding(GeocodeError::Timeout(_)) => "Geocoding timed out".to_string(),
            AppError::Geocoding(_) => "Geocoding failed".to_string(),
            AppError::ServerError(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(id) => AppError::Conflict(id),
            StoreError::Database(err) => AppError::ServerError(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::ServerError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}
