#![allow(non_snake_case)]

//! Browser-side core of the admin panel: the persisted session, the API
//! client, and the state machines behind the guard, the users table and the
//! user form. Views drive these and own the timers.

pub mod auth;
pub mod error;
pub mod form;
pub mod guard;
pub mod http;
pub mod list;
pub mod services;
pub mod session;
pub mod storage;
pub mod ticket;

pub use auth::AuthSession;
pub use error::ClientError;
pub use http::ApiClient;
pub use services::{AvatarFile, LookupService, UserPayload, UserService};
pub use session::{Session, SessionStore};
pub use storage::{MemoryStorage, TokenStorage};

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
