use roster_types::{ErrorBody, FieldErrors};
use thiserror::Error;

/// Every way an API call can fail, as seen by the views.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ClientError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("server returned {status}: {message}")]
    Server {
        status: u16,
        message: String,
    },
    #[error("network error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
    /// The request could not be built; nothing was sent.
    #[error("could not encode request: {0}")]
    Encode(String),
}

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

impl ClientError {
    /// Normalizes a non-2xx response. Bodies that are not the usual
    /// `{message, errors}` shape still produce an error of the right kind.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
        let message = parsed.message.filter(|m| !m.is_empty());

        match status {
            422 => ClientError::Validation(parsed.errors.unwrap_or_default()),
            401 => ClientError::Unauthorized(message.unwrap_or_else(|| "Unauthenticated.".into())),
            404 => ClientError::NotFound(message.unwrap_or_else(|| "Not found.".into())),
            _ => ClientError::Server {
                status,
                message: message.unwrap_or_else(|| UNEXPECTED_ERROR.into()),
            },
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// The text a toast should show: the server's own message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors
                .first_message()
                .unwrap_or("The given data was invalid.")
                .to_string(),
            ClientError::InvalidCredentials(message)
            | ClientError::Unauthorized(message)
            | ClientError::NotFound(message)
            | ClientError::Server { message, .. } => message.clone(),
            ClientError::Transport(_) => "Unable to reach the server. Please try again.".into(),
            ClientError::Decode(_) | ClientError::Encode(_) => UNEXPECTED_ERROR.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_status_codes_to_kinds() {
        let body = serde_json::json!({
            "message": "The email field is required.",
            "errors": {"email": ["The email field is required."]}
        })
        .to_string();
        let err = ClientError::from_response(422, &body);
        assert_eq!(
            err.field_errors().unwrap().first("email"),
            Some("The email field is required.")
        );

        assert_eq!(
            ClientError::from_response(401, r#"{"message":"Invalid credentials"}"#),
            ClientError::Unauthorized("Invalid credentials".into())
        );
        assert_eq!(
            ClientError::from_response(404, r#"{"message":"User not found."}"#).user_message(),
            "User not found."
        );
    }

    #[test]
    fn unreadable_bodies_fall_back_to_generic_messages() {
        let err = ClientError::from_response(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, ClientError::Server { status: 502, .. }));
        assert_eq!(err.user_message(), UNEXPECTED_ERROR);

        let err = ClientError::from_response(422, "{}");
        assert!(err.field_errors().unwrap().is_empty());
        assert_eq!(err.user_message(), "The given data was invalid.");
    }
}
