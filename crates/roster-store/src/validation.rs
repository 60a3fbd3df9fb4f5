//! Input rules for login and user records.
//!
//! Messages follow the wording the admin panel renders inline, one list per
//! field. An empty required field reports only that it is required.

use roster_types::{FieldErrors, Gender, LoginRequest, Role};

use crate::AvatarUpload;

pub const NAME_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const LOGIN_PASSWORD_MAX_CHARS: usize = 15;
pub const AVATAR_MAX_KILOBYTES: usize = 5096;
pub const AVATAR_EXTENSIONS: &[&str] = &["jpeg", "png", "jpg", "gif", "webp"];

/// Raw user form fields as submitted.
#[derive(Clone, Debug, Default)]
pub struct UserInput {
    pub name: String,
    pub gender: String,
    pub email: String,
    pub role_type: String,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update { id: i64 },
}

/// A user record that passed every rule.
#[derive(Clone, Debug)]
pub struct ValidUser {
    pub name: String,
    pub gender_id: i64,
    pub email: String,
    pub role_id: i64,
    pub password: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

pub fn validate_login(request: &LoginRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = request.email.trim();
    if email.is_empty() {
        errors.add("email", required("email"));
    } else if !is_valid_email(email) {
        errors.add("email", "The email field must be a valid email address.");
    }

    let passwordLen = request.password.chars().count();
    if request.password.is_empty() {
        errors.add("password", required("password"));
    } else if passwordLen < PASSWORD_MIN_CHARS {
        errors.add("password", min_chars("password", PASSWORD_MIN_CHARS));
    } else if passwordLen > LOGIN_PASSWORD_MAX_CHARS {
        errors.add("password", max_chars("password", LOGIN_PASSWORD_MAX_CHARS));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a submitted user against the lookup tables and the existing emails.
///
/// `email_taken` is asked only for syntactically valid addresses and must
/// ignore the user being updated.
pub fn validate_user(
    input: UserInput,
    mode: Mode,
    genders: &[Gender],
    roles: &[Role],
    email_taken: impl Fn(&str) -> bool,
) -> Result<ValidUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(avatar) = &input.avatar {
        if !has_allowed_extension(&avatar.file_name) {
            errors.add(
                "avatar",
                format!(
                    "The avatar field must be a file of type: {}.",
                    AVATAR_EXTENSIONS.join(", ")
                ),
            );
        }
        if avatar.bytes.len() > AVATAR_MAX_KILOBYTES * 1024 {
            errors.add("avatar", avatar_too_large());
        }
    }

    let name = input.name.trim().to_string();
    if name.is_empty() {
        errors.add("name", required("name"));
    } else if name.chars().count() > NAME_MAX_CHARS {
        errors.add("name", max_chars("name", NAME_MAX_CHARS));
    }

    let genderId = lookup_id(&input.gender, genders.iter().map(|g| g.id));
    if input.gender.trim().is_empty() {
        errors.add("gender", required("gender"));
    } else if genderId.is_none() {
        errors.add("gender", "The selected gender is invalid.");
    }

    let email = input.email.trim().to_string();
    if email.is_empty() {
        errors.add("email", required("email"));
    } else if !is_valid_email(&email) {
        errors.add("email", "The email field must be a valid email address.");
    } else if email_taken(&email) {
        errors.add("email", "The email has already been taken.");
    }

    let password = input.password.filter(|p| !p.is_empty());
    match (&password, mode) {
        (None, Mode::Create) => errors.add("password", required("password")),
        (None, Mode::Update { .. }) => {}
        (Some(p), _) => {
            if p.chars().count() < PASSWORD_MIN_CHARS {
                errors.add("password", min_chars("password", PASSWORD_MIN_CHARS));
            }
            if input.password_confirmation.as_deref() != Some(p.as_str()) {
                errors.add("password", "The password field confirmation does not match.");
            }
        }
    }

    let roleId = lookup_id(&input.role_type, roles.iter().map(|r| r.id));
    if input.role_type.trim().is_empty() {
        errors.add("role_type", required("role type"));
    } else if roleId.is_none() {
        errors.add("role_type", "The selected role type is invalid.");
    }

    match (genderId, roleId) {
        (Some(gender_id), Some(role_id)) if errors.is_empty() => Ok(ValidUser {
            name,
            gender_id,
            email,
            role_id,
            password,
            avatar: input.avatar,
        }),
        _ => Err(errors),
    }
}

/// Accepts `local@domain` with no whitespace and a domain that does not
/// start or end with a dot.
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    match candidate.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains("..")
        }
        None => false,
    }
}

pub fn has_allowed_extension(fileName: &str) -> bool {
    std::path::Path::new(fileName)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| AVATAR_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn avatar_too_large() -> String {
    format!("The avatar field must not be greater than {AVATAR_MAX_KILOBYTES} kilobytes.")
}

fn lookup_id(raw: &str, known: impl IntoIterator<Item = i64>) -> Option<i64> {
    let id = raw.trim().parse::<i64>().ok()?;
    known.into_iter().find(|k| *k == id)
}

fn required(label: &str) -> String {
    format!("The {label} field is required.")
}

fn min_chars(label: &str, min: usize) -> String {
    format!("The {label} field must be at least {min} characters.")
}

fn max_chars(label: &str, max: usize) -> String {
    format!("The {label} field must not be greater than {max} characters.")
}
