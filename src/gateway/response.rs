use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::ConsoleError;

/// `{ success: true, data }` envelope, the shape the console backend uses
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, status_code: None }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code: Some(status_code) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize response data");
            }
        };

        (status, Json(json!({ "success": true, "data": data }))).into_response()
    }
}

/// `{ success: false, message }` with the given status
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "success": false, "message": message.into() }))).into_response()
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = match &self {
            ConsoleError::Rejected { status: Some(code), .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_REQUEST)
            }
            ConsoleError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ConsoleError::Transport(_) | ConsoleError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            ConsoleError::Session(_) => StatusCode::UNAUTHORIZED,
            ConsoleError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ConsoleError::Account(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ if self.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "success": false,
            "error": self.error_code(),
            "message": self.user_message(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ConsoleError>;
