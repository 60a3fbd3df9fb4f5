#![allow(non_snake_case)]

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod tests;

use axum::{extract::DefaultBodyLimit, Router};
use http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

pub use crate::error::ApiError;
use crate::middleware::auth::AppState;

/// Largest request body accepted, sized for an avatar at its upload limit
/// plus the remaining form fields.
pub const BODY_LIMIT_BYTES: usize = 6 * 1024 * 1024;

/// The REST API, mounted under `/api`. Tokens travel in headers, so any
/// origin may call it.
pub fn api_router(state: AppState) -> Router {
    let apiRoutes = routes::api_routes(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .nest("/api", apiRoutes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state)
}
