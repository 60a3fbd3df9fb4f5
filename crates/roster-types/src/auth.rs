use serde::{Deserialize, Serialize};

use crate::User;

/// Absent fields read as empty so the server's own rules report them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn login_request_tolerates_missing_fields() {
        let request: LoginRequest = serde_json::from_str(r#"{"password":"Admin1234"}"#).unwrap();
        assert_eq!(request.email, "");
        assert_eq!(request.password, "Admin1234");
    }
}
