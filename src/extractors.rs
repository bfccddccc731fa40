use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::warn;

use crate::error::AppError;

/// `Json<T>` whose rejections (wrong content type, malformed JSON, wrong field
/// types) are answered as a 400 in the usual error body.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                warn!(status = %rejection.status(), "rejected request body");
                Err(AppError::InvalidBody(rejection.body_text()))
            }
        }
    }
}
