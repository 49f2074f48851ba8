use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ErrorBody;
use crate::store::{ErrorKind, StoreError};
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(err) = &self {
            tracing::error!(error = ?err, "internal error");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => AppError::NotFound("record not found".into()),
            ErrorKind::UniqueViolation => AppError::Conflict("record already exists".into()),
            ErrorKind::ForeignKeyViolation => {
                AppError::Conflict("record is referenced by or refers to another record".into())
            }
            ErrorKind::CheckViolation => match err {
                StoreError::Invalid(message) => AppError::BadRequest(message),
                _ => AppError::BadRequest("value violates a constraint".into()),
            },
            ErrorKind::Other => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_status() {
        assert_eq!(
            AppError::from(StoreError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        let invalid = AppError::from(StoreError::invalid("at least one role is required"));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "at least one role is required");
        assert_eq!(
            AppError::from(StoreError::Timeout(std::time::Duration::from_secs(1))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = AppError::Internal(anyhow::anyhow!("password=hunter2 leaked"));
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn token_errors_are_unauthorized() {
        assert_eq!(
            AppError::from(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
