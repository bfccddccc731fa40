use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{password, services::hash_password},
    error::{AppError, AppResult, ErrorResponse},
    extractors::AppJson,
    state::AppState,
    users::{
        dto::{CreateUserRequest, StatusResponse, UpdateUserRequest},
        repo_types::{NewUser, User, UserChanges},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route("/user/:id", get(get_user).put(update_user).delete(delete_user))
}

/// An id that does not parse cannot name any record.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = StatusResponse),
        (status = 400, description = "Missing fields, bad body or weak password", body = ErrorResponse),
        (status = 409, description = "Login already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<StatusResponse>)> {
    let (Some(name), Some(surname), Some(login), Some(plain)) = (
        required(payload.name),
        required(payload.surname),
        required(payload.login),
        required(payload.password),
    ) else {
        warn!("create user with missing fields");
        return Err(AppError::MissingFields);
    };

    // Advisory only; the unique index decides on insert.
    if state.store.find_by_login(&login).await?.is_some() {
        warn!(login = %login, "login already registered");
        return Err(AppError::LoginTaken);
    }

    let check = password::validate(&plain);
    if !check.valid {
        warn!(login = %login, reason = check.message, "weak password");
        return Err(AppError::WeakPassword(check.message));
    }

    let hashed = hash_password(plain).await?;

    let user = state
        .store
        .insert(NewUser {
            name,
            surname,
            login,
            password: hashed,
            profile_picture: payload.profile_picture,
        })
        .await?;

    info!(user_id = %user.id, login = %user.login, "user registered");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/user/{}", user.id))],
        Json(StatusResponse::ok("User has been added successfully")),
    ))
}

/// Returns the stored record verbatim, password hash included.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "Stored user record", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let id = parse_id(&id)?;
    let user = state.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

/// Overwrites name, surname and login as given. Neither emptiness nor login
/// uniqueness is checked here; a duplicate login is still refused by the store.
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = StatusResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Login already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<StatusResponse>> {
    let id = parse_id(&id)?;
    let changes = UserChanges {
        name: payload.name,
        surname: payload.surname,
        login: payload.login,
        profile_picture: payload.profile_picture,
    };
    let user = state
        .store
        .update(id, changes)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(StatusResponse::ok("User has been updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "User deleted", body = String, content_type = "text/plain"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<&'static str> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(user_id = %id, "user deleted");
    Ok("User has been deleted successfully")
}
