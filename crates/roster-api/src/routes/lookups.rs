use axum::{extract::State, routing::get, Json, Router};
use roster_types::{GendersEnvelope, RolesEnvelope};

use crate::middleware::auth::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fetchGenders", get(get_genders))
        .route("/fetchRoles", get(get_roles))
}

async fn get_genders(State(state): State<AppState>) -> Json<GendersEnvelope> {
    Json(GendersEnvelope {
        genders: state.directory.genders().await,
    })
}

async fn get_roles(State(state): State<AppState>) -> Json<RolesEnvelope> {
    Json(RolesEnvelope {
        roles: state.directory.roles().await,
    })
}
