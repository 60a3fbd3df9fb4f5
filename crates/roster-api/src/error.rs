use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use roster_store::{validation::avatar_too_large, StoreError};
use roster_types::{ErrorBody, FieldErrors};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Unauthenticated.")]
    Unauthenticated,
    #[error("malformed form data: {0}")]
    Multipart(#[from] MultipartError),
    #[error("malformed JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Store(StoreError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    message: Some(
                        errors
                            .first_message()
                            .unwrap_or("The given data was invalid.")
                            .to_string(),
                    ),
                    errors: Some(errors),
                },
            ),
            ApiError::Store(e @ StoreError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, message(e.to_string()))
            }
            ApiError::Store(e @ StoreError::UserNotFound(_)) => {
                (StatusCode::NOT_FOUND, message(e.to_string()))
            }
            ApiError::Store(e) => {
                error!("request failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message("The server could not complete the request.".into()),
                )
            }
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, message("Unauthenticated.".into()))
            }
            // The body limit trips while the avatar streams in.
            ApiError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                let mut errors = FieldErrors::new();
                errors.add("avatar", avatar_too_large());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorBody {
                        message: Some(avatar_too_large()),
                        errors: Some(errors),
                    },
                )
            }
            ApiError::Multipart(e) => (StatusCode::BAD_REQUEST, message(e.body_text())),
            ApiError::Json(e) => (e.status(), message(e.body_text())),
        };

        (status, Json(body)).into_response()
    }
}

fn message(text: String) -> ErrorBody {
    ErrorBody {
        message: Some(text),
        errors: None,
    }
}
