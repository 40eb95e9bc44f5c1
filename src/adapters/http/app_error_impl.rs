use crate::application::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, None)
            }
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
            AppError::PlanNotFound(id) => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::PlanNotFound, Some(id))
            }
            AppError::AlreadyExists => {
                error_resp(StatusCode::CONFLICT, ErrorCode::AlreadyExists, None)
            }
            AppError::InvalidTransition { from, event } => error_resp(
                StatusCode::CONFLICT,
                ErrorCode::InvalidTransition,
                Some(format!("{event} is not valid in state {from}")),
            ),
            AppError::VersionConflict => {
                error_resp(StatusCode::CONFLICT, ErrorCode::VersionConflict, None)
            }
            AppError::Contention => error_resp(StatusCode::CONFLICT, ErrorCode::Contention, None),
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::NotificationDeliveryFailed(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::NotificationDeliveryFailed,
                None,
            ),
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, None)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
