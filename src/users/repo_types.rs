use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::password::HashedPassword;

/// User record in the database.
///
/// Serialized as-is by `GET /user/:id`, so the password hash is part of the
/// response body.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub login: String,
    pub password: String, // Argon2 PHC string
    pub profile_picture: Option<String>,
}

/// Fields of a user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub login: String,
    pub password: HashedPassword,
    pub profile_picture: Option<String>,
}

/// Overwrite applied by an update. `profile_picture: None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: String,
    pub surname: String,
    pub login: String,
    pub profile_picture: Option<String>,
}
