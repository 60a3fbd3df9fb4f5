#![allow(non_snake_case)]

pub mod avatars;
pub mod directory;
pub mod error;
pub mod hashing;
pub mod seed;
pub mod validation;

pub use avatars::{AvatarStore, AvatarUpload};
pub use directory::UserDirectory;
pub use error::StoreError;
pub use hashing::PasswordHasher;
pub use seed::SeedOptions;
pub use validation::UserInput;
