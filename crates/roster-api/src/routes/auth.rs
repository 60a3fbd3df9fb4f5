use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use roster_types::{LoginRequest, LoginResponse, MessageResponse};
use tracing::info;

use crate::middleware::auth::{AppState, AuthUser};
use crate::ApiError;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/login", post(handle_login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/logout", post(handle_logout))
}

async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = body?;
    let (token, user) = state.directory.login(&body).await?;

    Ok(Json(LoginResponse {
        message: "Login Successful".into(),
        token,
        user,
    }))
}

async fn handle_logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Json<MessageResponse> {
    state.directory.revoke(&auth.token).await;
    info!("user {} logged out", auth.user.id);
    Json(MessageResponse::new("Logged out successfully."))
}
