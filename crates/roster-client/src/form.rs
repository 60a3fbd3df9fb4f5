use roster_types::{avatar_url, FieldErrors, Gender, Role, User};

use crate::{AvatarFile, ClientError, UserPayload};

pub const CONFIRM_PASSWORD: &str = "Please confirm your new password";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

impl FormMode {
    /// `None` for an id that is present but not a number.
    pub fn from_route(user_id: Option<&str>) -> Option<Self> {
        match user_id.map(str::trim).filter(|s| !s.is_empty()) {
            None => Some(FormMode::Create),
            Some(raw) => raw.parse().ok().map(FormMode::Edit),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormMode::Create => "Add User",
            FormMode::Edit(_) => "Edit User",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Gender,
    Email,
    RoleType,
    Password,
    PasswordConfirmation,
    Avatar,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Gender => "gender",
            Field::Email => "email",
            Field::RoleType => "role_type",
            Field::Password => "password",
            Field::PasswordConfirmation => "password_confirmation",
            Field::Avatar => "avatar",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub gender: String,
    pub email: String,
    pub role_type: String,
    pub password: String,
    pub password_confirmation: String,
}

/// A picked file and the object URL previewing it. The URL belongs to the
/// view, which revokes it once it is handed back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedAvatar {
    pub file: AvatarFile,
    pub preview_url: String,
}

/// What a successful save returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Saved {
    pub message: String,
    pub user: Option<User>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Show the message and leave for the list. `revoke` is a preview URL
    /// that is no longer displayed.
    Saved {
        message: String,
        revoke: Option<String>,
    },
    /// Field errors are now on the form.
    Invalid,
    Failed(ClientError),
}

/// The add/edit user form.
#[derive(Debug)]
pub struct UserForm {
    mode: FormMode,
    values: FormValues,
    errors: FieldErrors,
    stored_avatar: Option<String>,
    staged: Option<StagedAvatar>,
    genders: Vec<Gender>,
    roles: Vec<Role>,
    loading_user: bool,
    loading_genders: bool,
    loading_roles: bool,
    submitting: bool,
    blocked: bool,
}

impl UserForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            values: FormValues::default(),
            errors: FieldErrors::new(),
            stored_avatar: None,
            staged: None,
            genders: Vec::new(),
            roles: Vec::new(),
            loading_user: matches!(mode, FormMode::Edit(_)),
            loading_genders: true,
            loading_roles: true,
            submitting: false,
            blocked: false,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.first(field.key())
    }

    pub fn genders(&self) -> &[Gender] {
        &self.genders
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_loading(&self) -> bool {
        self.loading_user || self.loading_genders || self.loading_roles
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Set when the edited user could not be loaded.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.submitting && !self.blocked
    }

    pub fn apply_genders(
        &mut self,
        result: Result<Vec<Gender>, ClientError>,
    ) -> Result<(), ClientError> {
        self.loading_genders = false;
        self.genders = result?;
        Ok(())
    }

    pub fn apply_roles(
        &mut self,
        result: Result<Vec<Role>, ClientError>,
    ) -> Result<(), ClientError> {
        self.loading_roles = false;
        self.roles = result?;
        Ok(())
    }

    /// Fills the form from the user being edited. A failed load blocks
    /// submission for the rest of this form's life.
    pub fn load_user(&mut self, result: Result<User, ClientError>) -> Result<(), ClientError> {
        self.loading_user = false;
        let user = result.inspect_err(|_| self.blocked = true)?;

        self.values = FormValues {
            name: user.name,
            gender: user.gender_id.to_string(),
            email: user.email,
            role_type: user.role_id.to_string(),
            password: String::new(),
            password_confirmation: String::new(),
        };
        self.stored_avatar = user.avatar;
        self.errors.clear();
        Ok(())
    }

    /// Updates one field, drops its error and re-derives the password
    /// confirmation state.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.values.name = value,
            Field::Gender => self.values.gender = value,
            Field::Email => self.values.email = value,
            Field::RoleType => self.values.role_type = value,
            Field::Password => self.values.password = value,
            Field::PasswordConfirmation => self.values.password_confirmation = value,
            Field::Avatar => {}
        }
        self.errors.remove(field.key());
        self.reconcile_passwords();
    }

    fn reconcile_passwords(&mut self) {
        let password = &self.values.password;
        let confirmation = &self.values.password_confirmation;
        let key = Field::PasswordConfirmation.key();

        if password.is_empty() {
            self.errors.remove(key);
            if matches!(self.mode, FormMode::Edit(_)) {
                self.errors.remove(Field::Password.key());
            }
        } else if confirmation.is_empty() {
            self.errors.set(key, CONFIRM_PASSWORD);
        } else if password != confirmation {
            self.errors.set(key, PASSWORDS_DIFFER);
        } else {
            self.errors.remove(key);
        }
    }

    /// Stages a picked file. Returns the previous preview URL to revoke.
    pub fn select_avatar(
        &mut self,
        file: AvatarFile,
        preview_url: impl Into<String>,
    ) -> Option<String> {
        self.errors.remove(Field::Avatar.key());
        self.staged
            .replace(StagedAvatar {
                file,
                preview_url: preview_url.into(),
            })
            .map(|s| s.preview_url)
    }

    /// Drops the staged file, falling back to the stored avatar if any.
    pub fn clear_avatar(&mut self) -> Option<String> {
        self.errors.remove(Field::Avatar.key());
        self.staged.take().map(|s| s.preview_url)
    }

    pub fn staged_avatar(&self) -> Option<&StagedAvatar> {
        self.staged.as_ref()
    }

    pub fn preview(&self) -> Option<String> {
        match &self.staged {
            Some(staged) => Some(staged.preview_url.clone()),
            None => self.stored_avatar.as_deref().map(avatar_url),
        }
    }

    pub fn payload(&self) -> UserPayload {
        let v = &self.values;
        let password = (!v.password.is_empty()).then(|| v.password.clone());
        UserPayload {
            name: v.name.clone(),
            gender: v.gender.clone(),
            email: v.email.clone(),
            role_type: v.role_type.clone(),
            password_confirmation: password.as_ref().map(|_| v.password_confirmation.clone()),
            password,
            avatar: self.staged.as_ref().map(|s| s.file.clone()),
        }
    }

    /// Marks the form as submitting and returns what to send, unless a
    /// submission is not allowed right now.
    pub fn begin_submit(&mut self) -> Option<UserPayload> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        Some(self.payload())
    }

    pub fn finish_submit(&mut self, result: Result<Saved, ClientError>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(saved) => {
                let revoke = self.staged.take().map(|s| s.preview_url);
                match self.mode {
                    FormMode::Create => {
                        self.values = FormValues {
                            role_type: std::mem::take(&mut self.values.role_type),
                            ..FormValues::default()
                        };
                    }
                    FormMode::Edit(_) => {
                        if let Some(user) = saved.user {
                            self.stored_avatar = user.avatar;
                        }
                        self.values.password.clear();
                        self.values.password_confirmation.clear();
                    }
                }
                self.errors.clear();
                SubmitOutcome::Saved {
                    message: saved.message,
                    revoke,
                }
            }
            Err(ClientError::Validation(errors)) => {
                self.errors = errors;
                SubmitOutcome::Invalid
            }
            Err(e) => SubmitOutcome::Failed(e),
        }
    }
}
