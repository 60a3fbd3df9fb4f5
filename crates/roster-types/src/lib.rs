#![allow(non_snake_case)]

pub mod auth;
pub mod errors;
pub mod user;

pub use auth::*;
pub use errors::*;
pub use user::*;

/// Number of users the API returns per page.
pub const USERS_PER_PAGE: u32 = 10;

/// Public path under which stored avatars are served.
pub const AVATAR_PUBLIC_PATH: &str = "/storage/avatars";

/// Browser-facing URL of a stored avatar file.
pub fn avatar_url(file_name: &str) -> String {
    format!("{AVATAR_PUBLIC_PATH}/{file_name}")
}
