use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::{auth::password::CredentialError, users::repo::StoreError};

pub type AppResult<T> = Result<T, AppError>;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "error")]
    pub status: String,
    #[schema(example = "User not found")]
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Name, surname, login and password are required")]
    MissingFields,
    /// The request body was not JSON of the expected shape.
    #[error("{0}")]
    InvalidBody(String),
    #[error("Login is already taken")]
    LoginTaken,
    #[error("{0}")]
    WeakPassword(&'static str),
    #[error("User not found")]
    NotFound,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error(transparent)]
    Hashing(CredentialError),
    #[error(transparent)]
    Verification(CredentialError),
    #[error(transparent)]
    Store(StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields | AppError::InvalidBody(_) | AppError::WeakPassword(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::LoginTaken => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            AppError::Hashing(_) | AppError::Verification(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Hashing(_) => AppError::Hashing(err),
            CredentialError::Verification(_) => AppError::Verification(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::LoginTaken,
            StoreError::Database(_) => AppError::Store(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, body) = body_json(AppError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
        assert_eq!(body["status"], "error");

        let (status, body) =
            body_json(AppError::WeakPassword("Password must be 8 characters long")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Password must be 8 characters long");

        let (status, body) = body_json(AppError::InvalidBody("EOF while parsing".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "EOF while parsing");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let err = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let err = AppError::from(CredentialError::Verification("bad phc".into()));
        assert!(matches!(err, AppError::Verification(_)));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("phc"));
    }

    #[test]
    fn store_conflict_is_login_taken() {
        let err = AppError::from(StoreError::Conflict);
        assert!(matches!(err, AppError::LoginTaken));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn credential_errors_keep_their_kind() {
        let err = AppError::from(CredentialError::Hashing("boom".into()));
        assert!(matches!(err, AppError::Hashing(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
