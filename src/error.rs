use std::path::PathBuf;

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Errors raised while reading or rewriting the guarded files
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("block {marker:?} in {} has no closing line", path.display())]
    MalformedBlock { marker: &'static str, path: PathBuf },
    #[error("password mismatched")]
    PasswordMismatched,
}

pub type GuardResult<T> = Result<T, GuardError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn internal_error_response() {
        let error = AppError::InternalError("Something went wrong".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Something went wrong");
    }

    #[tokio::test]
    async fn guard_error_becomes_internal_error() {
        let error: AppError = GuardError::PasswordMismatched.into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"password mismatched");
    }
}
