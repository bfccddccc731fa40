use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::services::verify_password,
    error::{AppError, AppResult, ErrorResponse},
    state::AppState,
    users::dto::StatusResponse,
};

/// Credentials travel in the path, not the body.
#[derive(Debug, Deserialize)]
pub struct SignInParams {
    pub login: String,
    pub password: String,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/signIn/:login/:password", post(sign_in))
}

/// Check a login/password pair. No session or token is issued.
#[utoipa::path(
    post,
    path = "/signIn/{login}/{password}",
    params(
        ("login" = String, Path, description = "User login"),
        ("password" = String, Path, description = "Plaintext password")
    ),
    responses(
        (status = 200, description = "Password matches", body = StatusResponse),
        (status = 401, description = "Incorrect password", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all, fields(login = %params.login))]
pub async fn sign_in(
    State(state): State<AppState>,
    Path(params): Path<SignInParams>,
) -> AppResult<Json<StatusResponse>> {
    let user = match state.store.find_by_login(&params.login).await? {
        Some(u) => u,
        None => {
            warn!("sign-in for unknown login");
            return Err(AppError::NotFound);
        }
    };

    if !verify_password(params.password, user.password).await? {
        warn!(user_id = %user.id, "sign-in with incorrect password");
        return Err(AppError::IncorrectPassword);
    }

    info!(user_id = %user.id, "user signed in");
    Ok(Json(StatusResponse::ok("Signed in successfully")))
}
