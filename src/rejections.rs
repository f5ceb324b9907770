use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{Error, ErrorKind};

/// Error returned by handlers. Every variant renders as a JSON body with a
/// stable `error` code.
#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    Forbidden(&'static str),
    Input(String),
    Domain(Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "missing or invalid token".to_string(),
            ),
            AppError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", message.to_string())
            }
            AppError::Input(message) => (
                StatusCode::BAD_REQUEST,
                ErrorKind::Validation.as_str(),
                message.clone(),
            ),
            AppError::Domain(err) => {
                let kind = err.kind();
                let message = match kind {
                    ErrorKind::Internal => "internal error".to_string(),
                    _ => err.to_string(),
                };
                (status_for(kind), kind.as_str(), message)
            }
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InsufficientResource => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Domain(err) = &self {
            match err.kind() {
                ErrorKind::Internal | ErrorKind::UpstreamUnavailable => {
                    tracing::error!("request failed: {err:?}")
                }
                _ => tracing::warn!("request rejected: {err}"),
            }
        }

        let (status, code, message) = self.parts();
        let body = ErrorBody {
            error: code,
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Domain(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Input(rejection.body_text())
    }
}
