use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use roster_store::UserDirectory;
use roster_types::User;

use crate::ApiError;

#[derive(Clone, Debug)]
pub struct AppState {
    pub directory: UserDirectory,
}

/// The caller behind a valid bearer token, attached to the request by
/// [`require_api_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Middleware for API routes: checks Authorization: Bearer <token> header.
pub async fn require_api_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return ApiError::Unauthenticated.into_response();
    };

    let Some(user) = state.directory.authenticate(&token).await else {
        tracing::debug!("rejected unknown bearer token");
        return ApiError::Unauthenticated.into_response();
    };

    request.extensions_mut().insert(AuthUser { user, token });
    next.run(request).await
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let authHeader = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = authHeader.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }
}
