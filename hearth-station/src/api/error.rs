use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::error::{GatewayError, RequestFailure};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl<S> From<RequestFailure<S>> for ApiError {
    fn from(failure: RequestFailure<S>) -> Self {
        ApiError::Gateway(failure.into_error())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Gateway(e @ GatewayError::Transport(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, Some(e.kind()))
            }
            ApiError::Gateway(e) => (StatusCode::BAD_GATEWAY, Some(e.kind())),
        };

        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
            error: kind.map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}
