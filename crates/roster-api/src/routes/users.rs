use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use roster_store::{AvatarUpload, UserInput};
use roster_types::{MessageResponse, UserEnvelope, UserUpdated, UsersEnvelope};
use serde::Deserialize;

use crate::middleware::auth::{AppState, AuthUser};
use crate::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fetchUsers", get(get_users))
        .route("/user/show/:id", get(get_user))
        .route("/user/store", post(post_store_user))
        .route("/user/update/:id", post(post_update_user))
        .route("/user/delete/:id", delete(delete_user))
}

#[derive(Debug, Default, Deserialize)]
struct FetchUsersParams {
    page: Option<String>,
    search: Option<String>,
}

async fn get_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<FetchUsersParams>,
) -> Json<UsersEnvelope> {
    // Unparseable pages fall back to the first one.
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1);
    let search = params.search.unwrap_or_default();

    let users = state.directory.list(auth.user.id, page, &search).await;
    Json(UsersEnvelope { users })
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = state.directory.show(id).await?;
    Ok(Json(UserEnvelope { user }))
}

async fn post_store_user(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = read_user_form(multipart).await?;
    state.directory.create(input).await?;
    Ok(Json(MessageResponse::new("User created successfully.")))
}

async fn post_update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<UserUpdated>, ApiError> {
    let input = read_user_form(multipart).await?;
    let user = state.directory.update(id, input).await?;
    Ok(Json(UserUpdated {
        message: "User updated successfully.".into(),
        user,
    }))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.directory.delete(auth.user.id, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully.")))
}

/// Collects the user form fields. Unknown fields are ignored, and an avatar
/// part without a file name or content counts as no avatar.
async fn read_user_form(mut multipart: Multipart) -> Result<UserInput, ApiError> {
    let mut input = UserInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "avatar" => {
                let fileName = field.file_name().map(str::to_string);
                let contentType = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if let Some(fileName) = fileName.filter(|n| !n.is_empty()) {
                    if !bytes.is_empty() {
                        input.avatar = Some(AvatarUpload {
                            file_name: fileName,
                            content_type: contentType,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
            }
            "name" => input.name = field.text().await?,
            "gender" => input.gender = field.text().await?,
            "email" => input.email = field.text().await?,
            "role_type" => input.role_type = field.text().await?,
            "password" => input.password = Some(field.text().await?),
            "password_confirmation" => input.password_confirmation = Some(field.text().await?),
            other => tracing::debug!("ignoring unexpected form field {other:?}"),
        }
    }

    Ok(input)
}
