use roster_types::User;
use serde::Deserialize;
use tracing::info;

use crate::{StoreError, UserDirectory};

pub const GENDERS: &[&str] = &["Male", "Female", "Others"];
pub const ROLES: &[&str] = &["administrator", "manager", "cashier"];

const FIRST_NAMES: &[&str] = &[
    "Amara", "Bruno", "Chen", "Dalia", "Emeka", "Freya", "Goran", "Hana", "Ivo", "Jade", "Kofi",
    "Lena",
];
const LAST_NAMES: &[&str] = &[
    "Okafor", "Silva", "Wang", "Haddad", "Nwosu", "Larsen", "Petrov", "Sato", "Novak", "Moreau",
];

/// Password shared by every generated dummy account.
pub const DUMMY_PASSWORD: &str = "password";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub dummy_users: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            admin_name: "Administrator".into(),
            admin_email: "admin@example.com".into(),
            admin_password: "change-me-now".into(),
            dummy_users: 10,
        }
    }
}

/// Fills an empty directory with the lookup tables, the administrator and
/// `dummy_users` generated accounts. Returns the administrator.
pub async fn seed(directory: &UserDirectory, options: &SeedOptions) -> Result<User, StoreError> {
    for gender in GENDERS {
        directory.add_gender(gender).await;
    }
    for role in ROLES {
        directory.add_role(role).await;
    }

    let adminHash = directory.hasher().hash(&options.admin_password)?;
    let admin = directory
        .insert_account(&options.admin_name, &options.admin_email, 1, 1, adminHash)
        .await;

    if options.dummy_users > 0 {
        let dummyHash = directory.hasher().hash(DUMMY_PASSWORD)?;
        for n in 0..options.dummy_users {
            let first = FIRST_NAMES[n % FIRST_NAMES.len()];
            let last = LAST_NAMES[(n * 7 + 3) % LAST_NAMES.len()];
            let email = format!("{}.{}{n}@example.com", first.to_lowercase(), last.to_lowercase());
            let genderId = (n % GENDERS.len()) as i64 + 1;
            let roleId = (n % ROLES.len()) as i64 + 1;
            directory
                .insert_account(
                    &format!("{first} {last}"),
                    &email,
                    genderId,
                    roleId,
                    dummyHash.clone(),
                )
                .await;
        }
    }

    info!(
        "seeded {} genders, {} roles, administrator {} and {} dummy users",
        GENDERS.len(),
        ROLES.len(),
        options.admin_email,
        options.dummy_users
    );
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AvatarStore, PasswordHasher};
    use roster_types::LoginRequest;

    #[tokio::test]
    async fn seeds_lookups_admin_and_dummies() {
        let dir = tempfile::tempdir().unwrap();
        let directory = UserDirectory::new(
            PasswordHasher::minimal().unwrap(),
            AvatarStore::new(dir.path()),
        );
        let options = SeedOptions {
            admin_password: "Admin1234".into(),
            dummy_users: 4,
            ..SeedOptions::default()
        };

        let admin = seed(&directory, &options).await.unwrap();

        assert_eq!(directory.genders().await.len(), 3);
        assert_eq!(directory.roles().await[0].role_type, "administrator");
        assert_eq!(directory.list(admin.id, 1, "").await.total, 4);

        let login = LoginRequest {
            email: options.admin_email.clone(),
            password: "Admin1234".into(),
        };
        assert!(directory.login(&login).await.is_ok());
    }
}
