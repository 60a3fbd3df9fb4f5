pub mod auth;
pub mod lookups;
pub mod users;

use axum::{middleware, Router};

use crate::middleware::auth::{require_api_auth, AppState};

pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(lookups::routes())
        .merge(users::routes())
        .route_layer(middleware::from_fn_with_state(state, require_api_auth));

    Router::new().merge(auth::public_routes()).merge(protected)
}
