use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use rand::{rngs::OsRng, TryRngCore};
use roster_types::{Gender, LoginRequest, PaginatedResult, Role, User, USERS_PER_PAGE};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::validation::{self, Mode, ValidUser};
use crate::{AvatarStore, PasswordHasher, StoreError, UserInput};

/// Users, lookup tables and issued bearer tokens.
///
/// Cloning is cheap; clones share the same records.
#[derive(Clone, Debug)]
pub struct UserDirectory {
    inner: Arc<RwLock<Directory>>,
    hasher: PasswordHasher,
    avatars: AvatarStore,
}

#[derive(Debug, Default)]
struct Directory {
    users: BTreeMap<i64, Account>,
    genders: Vec<Gender>,
    roles: Vec<Role>,
    tokens: HashMap<String, i64>,
    next_user_id: i64,
}

#[derive(Debug)]
struct Account {
    user: User,
    password_hash: String,
}

impl Directory {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|a| Some(a.user.id) != except && a.user.email.eq_ignore_ascii_case(email))
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_user_id += 1;
        self.next_user_id
    }
}

impl UserDirectory {
    pub fn new(hasher: PasswordHasher, avatars: AvatarStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Directory::default())),
            hasher,
            avatars,
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn avatars(&self) -> &AvatarStore {
        &self.avatars
    }

    pub async fn add_gender(&self, name: &str) -> Gender {
        let mut dir = self.inner.write().await;
        let gender = Gender {
            id: dir.genders.len() as i64 + 1,
            gender: name.to_string(),
        };
        dir.genders.push(gender.clone());
        gender
    }

    pub async fn add_role(&self, name: &str) -> Role {
        let mut dir = self.inner.write().await;
        let role = Role {
            id: dir.roles.len() as i64 + 1,
            role_type: name.to_string(),
        };
        dir.roles.push(role.clone());
        role
    }

    /// Inserts an account with an already computed hash, skipping validation.
    pub async fn insert_account(
        &self,
        name: &str,
        email: &str,
        gender_id: i64,
        role_id: i64,
        password_hash: String,
    ) -> User {
        let mut dir = self.inner.write().await;
        let id = dir.allocate_id();
        let now = Utc::now();
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            gender_id,
            role_id,
            avatar: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        dir.users.insert(
            id,
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        user
    }

    /// Checks credentials and issues a new bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<(String, User), StoreError> {
        validation::validate_login(request).map_err(StoreError::Validation)?;

        let email = request.email.trim();
        let candidate = {
            let dir = self.inner.read().await;
            dir.users
                .values()
                .find(|a| a.user.email.eq_ignore_ascii_case(email))
                .map(|a| (a.user.clone(), a.password_hash.clone()))
        };

        let Some((user, passwordHash)) = candidate else {
            info!("login rejected for unknown email");
            return Err(StoreError::InvalidCredentials);
        };
        if !self.hasher.verify(&request.password, &passwordHash) {
            info!("login rejected for user {}", user.id);
            return Err(StoreError::InvalidCredentials);
        }

        let token = generate_token()?;
        self.inner.write().await.tokens.insert(token.clone(), user.id);
        info!("user {} logged in", user.id);
        Ok((token, user))
    }

    pub async fn authenticate(&self, token: &str) -> Option<User> {
        let dir = self.inner.read().await;
        let userId = dir.tokens.get(token)?;
        dir.users.get(userId).map(|a| a.user.clone())
    }

    /// Returns whether the token was live.
    pub async fn revoke(&self, token: &str) -> bool {
        self.inner.write().await.tokens.remove(token).is_some()
    }

    /// Every user except `viewer_id`, filtered by a case-insensitive match on
    /// name or email, one page at a time.
    pub async fn list(&self, viewer_id: i64, page: u32, search: &str) -> PaginatedResult<User> {
        let needle = search.trim().to_lowercase();
        let dir = self.inner.read().await;
        let matches: Vec<User> = dir
            .users
            .values()
            .map(|a| &a.user)
            .filter(|u| u.id != viewer_id)
            .filter(|u| {
                needle.is_empty()
                    || u.name.to_lowercase().contains(&needle)
                    || u.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        PaginatedResult::paginate(matches, page, USERS_PER_PAGE)
    }

    pub async fn genders(&self) -> Vec<Gender> {
        self.inner.read().await.genders.clone()
    }

    pub async fn roles(&self) -> Vec<Role> {
        self.inner.read().await.roles.clone()
    }

    pub async fn show(&self, id: i64) -> Result<User, StoreError> {
        let dir = self.inner.read().await;
        dir.users
            .get(&id)
            .map(|a| a.user.clone())
            .ok_or(StoreError::UserNotFound(id))
    }

    pub async fn create(&self, input: UserInput) -> Result<User, StoreError> {
        let valid = self.validate(input, Mode::Create).await?;
        let passwordHash = match &valid.password {
            Some(p) => self.hasher.hash(p)?,
            None => return Err(StoreError::invalid("password", "The password field is required.")),
        };
        let avatar = self.store_avatar(&valid).await?;

        let mut dir = self.inner.write().await;
        if dir.email_taken(&valid.email, None) {
            drop(dir);
            self.discard_avatar(avatar).await;
            return Err(StoreError::invalid("email", "The email has already been taken."));
        }

        let id = dir.allocate_id();
        let now = Utc::now();
        let user = User {
            id,
            name: valid.name,
            email: valid.email,
            gender_id: valid.gender_id,
            role_id: valid.role_id,
            avatar,
            created_at: Some(now),
            updated_at: Some(now),
        };
        dir.users.insert(
            id,
            Account {
                user: user.clone(),
                password_hash: passwordHash,
            },
        );
        info!("created user {id}");
        Ok(user)
    }

    /// Replaces the record of `id`. The password and avatar only change when
    /// new ones are submitted.
    pub async fn update(&self, id: i64, input: UserInput) -> Result<User, StoreError> {
        let valid = self.validate(input, Mode::Update { id }).await?;
        let passwordHash = valid.password.as_deref().map(|p| self.hasher.hash(p)).transpose()?;
        let newAvatar = self.store_avatar(&valid).await?;

        let mut dir = self.inner.write().await;
        if dir.email_taken(&valid.email, Some(id)) || !dir.users.contains_key(&id) {
            let missing = !dir.users.contains_key(&id);
            drop(dir);
            self.discard_avatar(newAvatar).await;
            return Err(if missing {
                StoreError::UserNotFound(id)
            } else {
                StoreError::invalid("email", "The email has already been taken.")
            });
        }

        let Some(account) = dir.users.get_mut(&id) else {
            return Err(StoreError::UserNotFound(id));
        };
        let replacedAvatar = match newAvatar {
            Some(name) => account.user.avatar.replace(name),
            None => None,
        };
        account.user.name = valid.name;
        account.user.email = valid.email;
        account.user.gender_id = valid.gender_id;
        account.user.role_id = valid.role_id;
        account.user.updated_at = Some(Utc::now());
        if let Some(hash) = passwordHash {
            account.password_hash = hash;
        }
        let user = account.user.clone();
        drop(dir);

        self.discard_avatar(replacedAvatar).await;
        info!("updated user {id}");
        Ok(user)
    }

    /// Removes `id` and every token issued to it. Users cannot delete themselves.
    pub async fn delete(&self, viewer_id: i64, id: i64) -> Result<(), StoreError> {
        if viewer_id == id {
            return Err(StoreError::invalid("user", "You cannot delete your own account."));
        }

        let mut dir = self.inner.write().await;
        let account = dir.users.remove(&id).ok_or(StoreError::UserNotFound(id))?;
        dir.tokens.retain(|_, owner| *owner != id);
        drop(dir);

        self.discard_avatar(account.user.avatar).await;
        info!("user {viewer_id} deleted user {id}");
        Ok(())
    }

    async fn validate(&self, input: UserInput, mode: Mode) -> Result<ValidUser, StoreError> {
        let dir = self.inner.read().await;
        if let Mode::Update { id } = mode {
            if !dir.users.contains_key(&id) {
                return Err(StoreError::UserNotFound(id));
            }
        }
        let except = match mode {
            Mode::Create => None,
            Mode::Update { id } => Some(id),
        };
        validation::validate_user(input, mode, &dir.genders, &dir.roles, |email| {
            dir.email_taken(email, except)
        })
        .map_err(StoreError::Validation)
    }

    async fn store_avatar(&self, valid: &ValidUser) -> Result<Option<String>, StoreError> {
        match &valid.avatar {
            Some(upload) => Ok(Some(self.avatars.save(upload).await?)),
            None => Ok(None),
        }
    }

    async fn discard_avatar(&self, name: Option<String>) {
        if let Some(name) = name {
            self.avatars.remove(&name).await;
        }
    }
}

fn generate_token() -> Result<String, StoreError> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        warn!("OS random source failed: {e}");
        StoreError::Token(e.to_string())
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AvatarUpload;
    use pretty_assertions::assert_eq;

    struct Fixture {
        directory: UserDirectory,
        admin: User,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let hasher = PasswordHasher::minimal().unwrap();
        let directory = UserDirectory::new(hasher.clone(), AvatarStore::new(dir.path()));
        directory.add_gender("Male").await;
        directory.add_gender("Female").await;
        directory.add_role("administrator").await;
        let admin = directory
            .insert_account("Admin", "admin@example.com", 1, 1, hasher.hash("Password1").unwrap())
            .await;
        Fixture {
            directory,
            admin,
            _dir: dir,
        }
    }

    fn input(email: &str) -> UserInput {
        UserInput {
            name: "Ada Lovelace".into(),
            gender: "2".into(),
            email: email.into(),
            role_type: "1".into(),
            password: Some("Engines42".into()),
            password_confirmation: Some("Engines42".into()),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn login_issues_a_token_that_authenticates_until_revoked() {
        let f = fixture().await;
        let request = LoginRequest {
            email: "ADMIN@example.com".into(),
            password: "Password1".into(),
        };

        let (token, user) = f.directory.login(&request).await.unwrap();
        assert_eq!(user.id, f.admin.id);
        assert_eq!(f.directory.authenticate(&token).await.map(|u| u.id), Some(f.admin.id));

        assert!(f.directory.revoke(&token).await);
        assert!(f.directory.authenticate(&token).await.is_none());
        assert!(!f.directory.revoke(&token).await);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let f = fixture().await;
        let request = LoginRequest {
            email: "admin@example.com".into(),
            password: "Password2".into(),
        };
        assert!(matches!(f.directory.login(&request).await, Err(StoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn list_excludes_viewer_and_filters_by_search() {
        let f = fixture().await;
        for n in 0..12 {
            f.directory.create(input(&format!("user{n}@example.com"))).await.unwrap();
        }
        f.directory
            .create(UserInput {
                name: "Zed Shaw".into(),
                ..input("zed@shaw.io")
            })
            .await
            .unwrap();

        let first = f.directory.list(f.admin.id, 1, "").await;
        assert_eq!(first.total, 13);
        assert_eq!(first.last_page, 2);
        assert!(first.data.iter().all(|u| u.id != f.admin.id));

        let found = f.directory.list(f.admin.id, 1, "SHAW").await;
        assert_eq!(found.data.len(), 1);
        assert_eq!(found.data[0].name, "Zed Shaw");
    }

    #[tokio::test]
    async fn update_keeps_password_when_blank_and_replaces_avatar() {
        let f = fixture().await;
        let created = f
            .directory
            .create(UserInput {
                avatar: Some(AvatarUpload {
                    file_name: "a.png".into(),
                    content_type: None,
                    bytes: vec![1],
                }),
                ..input("ada@example.com")
            })
            .await
            .unwrap();
        let oldAvatar = created.avatar.clone().unwrap();

        let updated = f
            .directory
            .update(
                created.id,
                UserInput {
                    name: "Ada King".into(),
                    password: None,
                    password_confirmation: None,
                    avatar: Some(AvatarUpload {
                        file_name: "b.jpg".into(),
                        content_type: None,
                        bytes: vec![2],
                    }),
                    ..input("ada@example.com")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada King");
        assert_ne!(updated.avatar.as_deref(), Some(oldAvatar.as_str()));
        assert!(!f.directory.avatars().dir().join(&oldAvatar).exists());

        let login = LoginRequest {
            email: "ada@example.com".into(),
            password: "Engines42".into(),
        };
        assert!(f.directory.login(&login).await.is_ok());
    }

    #[tokio::test]
    async fn missing_users_are_not_found() {
        let f = fixture().await;
        assert!(matches!(f.directory.show(99).await, Err(StoreError::UserNotFound(99))));
        assert!(matches!(
            f.directory.update(99, input("x@example.com")).await,
            Err(StoreError::UserNotFound(99))
        ));
        assert!(matches!(
            f.directory.delete(f.admin.id, 99).await,
            Err(StoreError::UserNotFound(99))
        ));
    }

    #[tokio::test]
    async fn delete_revokes_tokens_and_refuses_self() {
        let f = fixture().await;
        let ada = f.directory.create(input("ada@example.com")).await.unwrap();
        let (token, _) = f
            .directory
            .login(&LoginRequest {
                email: "ada@example.com".into(),
                password: "Engines42".into(),
            })
            .await
            .unwrap();

        assert!(matches!(
            f.directory.delete(ada.id, ada.id).await,
            Err(StoreError::Validation(_))
        ));
        f.directory.delete(f.admin.id, ada.id).await.unwrap();
        assert!(f.directory.authenticate(&token).await.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error() {
        let f = fixture().await;
        let err = f.directory.create(input("Admin@Example.com")).await.unwrap_err();
        match err {
            StoreError::Validation(errors) => {
                assert_eq!(errors.first("email"), Some("The email has already been taken."))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
