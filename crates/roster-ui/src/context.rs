use leptos::prelude::*;
use roster_client::{ApiClient, AuthSession, LookupService, SessionStore, UserService};
use roster_types::User;

/// Services shared by every view, provided once by [`crate::App`].
///
/// Session reads go through `revision`, which the session store bumps on
/// every change, so views re-render on login and logout. Nothing reports a
/// session before `ready` flips on the client; the server render has none.
#[derive(Clone, Debug)]
pub struct ClientContext {
    pub auth: AuthSession,
    pub users: UserService,
    pub lookups: LookupService,
    revision: RwSignal<u64>,
    ready: RwSignal<bool>,
}

impl ClientContext {
    pub fn new() -> Self {
        let api = Self::api();
        let revision = RwSignal::new(0u64);
        api.session().subscribe(move || {
            revision.try_update(|r| *r += 1);
        });

        Self {
            auth: AuthSession::new(api.clone()),
            users: UserService::new(api.clone()),
            lookups: LookupService::new(api),
            revision,
            ready: RwSignal::new(false),
        }
    }

    #[cfg(feature = "hydrate")]
    fn api() -> ApiClient {
        ApiClient::from_window(SessionStore::restore(roster_client::BrowserStorage))
    }

    #[cfg(not(feature = "hydrate"))]
    fn api() -> ApiClient {
        ApiClient::new("/api", SessionStore::in_memory())
    }

    pub fn mark_ready(&self) {
        self.ready.set(true);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.revision.track();
        self.ready.get() && self.auth.is_logged_in()
    }

    pub fn current_user(&self) -> Option<User> {
        self.revision.track();
        if !self.ready.get() {
            return None;
        }
        self.auth.session().user()
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_client() -> ClientContext {
    expect_context::<ClientContext>()
}
