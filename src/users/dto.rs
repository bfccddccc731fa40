use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /user`. Every field is optional on the wire so that
/// missing ones are reported together as a 400 instead of a parse failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[schema(example = "Ann")]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(example = "Lee")]
    pub surname: Option<String>,
    #[serde(default)]
    #[schema(example = "annlee")]
    pub login: Option<String>,
    #[serde(default)]
    #[schema(example = "Abc123de", format = Password)]
    pub password: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Request body for `PUT /user/:id`. Absent text fields become empty strings.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// `{status: "ok", message}` body shared by the write endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.to_string(),
        }
    }
}
