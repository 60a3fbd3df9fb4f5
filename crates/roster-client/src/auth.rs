use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use roster_types::{LoginRequest, LoginResponse, MessageResponse};
use tracing::{info, warn};

use crate::{ApiClient, ClientError, Session, SessionStore};

/// Login and logout on top of the shared [`SessionStore`].
#[derive(Clone, Debug)]
pub struct AuthSession {
    api: ApiClient,
    just_logged_out: Arc<AtomicBool>,
}

impl AuthSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            just_logged_out: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_logged_in()
    }

    /// Exchanges credentials for a session. A 401 becomes
    /// [`ClientError::InvalidCredentials`] carrying the server's message.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = match self.api.post("login", &request).await {
            Ok(response) => response,
            Err(ClientError::Unauthorized(message)) => {
                return Err(ClientError::InvalidCredentials(message))
            }
            Err(e) => return Err(e),
        };

        let session = Session {
            token: response.token,
            user: response.user,
        };
        self.just_logged_out.store(false, Ordering::SeqCst);
        self.session().set(session.clone());
        info!("logged in as user {}", session.user.id);
        Ok(session)
    }

    /// Ends the session locally first, then revokes the token on the server.
    /// The remote outcome never changes the local result, and a second call
    /// while the first is still in flight finds no token and does nothing.
    pub async fn logout(&self) {
        if !self.is_logged_in() {
            return;
        }
        self.just_logged_out.store(true, Ordering::SeqCst);
        let Some(previous) = self.session().take() else {
            return;
        };

        match self.api.post_as::<MessageResponse>("logout", &previous.token).await {
            Ok(_) => info!("logged out user {}", previous.user.id),
            Err(e) => warn!("server-side logout failed, session cleared locally: {e}"),
        }
    }

    /// Reads and resets the flag set by the last logout.
    pub fn take_just_logged_out(&self) -> bool {
        self.just_logged_out.swap(false, Ordering::SeqCst)
    }
}
