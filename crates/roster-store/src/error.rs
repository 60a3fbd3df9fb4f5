use roster_types::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}", .0.first_message().unwrap_or("The given data was invalid."))]
    Validation(FieldErrors),
    #[error("Invalid credentials, please try again.")]
    InvalidCredentials,
    #[error("User not found.")]
    UserNotFound(i64),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token generation failed: {0}")]
    Token(String),
    #[error("avatar storage failed: {0}")]
    Avatar(#[from] std::io::Error),
}

impl StoreError {
    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        StoreError::Validation(errors)
    }
}
