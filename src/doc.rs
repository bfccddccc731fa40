//! OpenAPI document served next to the Swagger UI.

use utoipa::OpenApi;

use crate::{
    error::ErrorResponse,
    users::{
        dto::{CreateUserRequest, StatusResponse, UpdateUserRequest},
        repo_types::User,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Network",
        description = "User accounts and password sign-in."
    ),
    paths(
        crate::users::handlers::create_user,
        crate::users::handlers::get_user,
        crate::users::handlers::update_user,
        crate::users::handlers::delete_user,
        crate::auth::handlers::sign_in,
    ),
    components(schemas(
        CreateUserRequest,
        UpdateUserRequest,
        StatusResponse,
        User,
        ErrorResponse
    )),
    tags(
        (name = "users", description = "Create, read, update and delete accounts"),
        (name = "auth", description = "Password sign-in")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::{schema::Schema, RefOr};

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/user", "/user/{id}", "/signIn/{login}/{password}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn user_schema_uses_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get("User").expect("User schema") {
            RefOr::T(Schema::Object(obj)) => {
                assert!(obj.properties.contains_key("profilePicture"));
                assert!(obj.properties.contains_key("password"));
            }
            _ => panic!("expected Object schema"),
        }
    }
}
