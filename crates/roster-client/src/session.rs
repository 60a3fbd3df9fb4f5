use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use roster_types::User;
use tracing::{info, warn};

use crate::storage::{MemoryStorage, TokenStorage};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// A logged-in user and the bearer token issued to them. Token and user only
/// ever exist together.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Process-wide holder of the current [`Session`], mirrored to durable storage.
///
/// Clones share state. Observers registered with [`SessionStore::subscribe`]
/// run after every change.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    current: RwLock<Option<Session>>,
    storage: Box<dyn TokenStorage>,
    listeners: RwLock<Vec<Listener>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Reads a previously persisted session. Half a session (token without a
    /// readable user or the other way round) counts as none and is wiped.
    pub fn restore(storage: impl TokenStorage + 'static) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = storage
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok());

        let current = match (token, user) {
            (Some(token), Some(user)) => {
                info!("restored session for user {}", user.id);
                Some(Session { token, user })
            }
            (None, None) => None,
            _ => {
                warn!("discarding incomplete stored session");
                storage.remove(TOKEN_KEY);
                storage.remove(USER_KEY);
                None
            }
        };

        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(current),
                storage: Box::new(storage),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::restore(MemoryStorage::new())
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn user(&self) -> Option<User> {
        self.current().map(|s| s.user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set(&self, session: Session) {
        match serde_json::to_string(&session.user) {
            Ok(user) => {
                self.inner.storage.set(TOKEN_KEY, &session.token);
                self.inner.storage.set(USER_KEY, &user);
            }
            Err(e) => warn!("session kept in memory only: {e}"),
        }
        *self.inner.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        self.notify();
    }

    /// Clears the session and returns what it held. Observers only hear about
    /// it when there was something to clear.
    pub fn take(&self) -> Option<Session> {
        let previous = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.inner.storage.remove(TOKEN_KEY);
        self.inner.storage.remove(USER_KEY);
        if previous.is_some() {
            self.notify();
        }
        previous
    }

    pub fn clear(&self) {
        self.take();
    }

    /// Clears the session only while it still holds `token`. Returns whether
    /// it did.
    pub fn clear_if_token(&self, token: &str) -> bool {
        let previous = {
            let mut current = self.inner.current.write().unwrap_or_else(PoisonError::into_inner);
            match current.as_ref() {
                Some(session) if session.token == token => current.take(),
                _ => None,
            }
        };
        if previous.is_none() {
            return false;
        }
        self.inner.storage.remove(TOKEN_KEY);
        self.inner.storage.remove(USER_KEY);
        self.notify();
        true
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    fn notify(&self) {
        let listeners = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener();
        }
    }
}

#[cfg(test)]
pub(crate) fn test_user(id: i64) -> User {
    User {
        id,
        name: format!("User {id}"),
        email: format!("user{id}@example.com"),
        gender_id: 1,
        role_id: 1,
        avatar: None,
        created_at: None,
        updated_at: None,
    }
}
