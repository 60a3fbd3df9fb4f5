use std::num::NonZeroU32;

use reqwest::multipart::{Form, Part};
use roster_types::{
    Gender, GendersEnvelope, MessageResponse, PaginatedResult, Role, RolesEnvelope, User,
    UserEnvelope, UserUpdated, UsersEnvelope,
};

use crate::{ApiClient, ClientError};

/// A file picked for upload, already read into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The user form as it goes over the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPayload {
    pub name: String,
    pub gender: String,
    pub email: String,
    pub role_type: String,
    /// Sent together with `password_confirmation`, and only when set.
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub avatar: Option<AvatarFile>,
}

impl UserPayload {
    /// Text parts in submission order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("gender", self.gender.clone()),
            ("email", self.email.clone()),
            ("role_type", self.role_type.clone()),
        ];
        if let Some(password) = self.password.as_ref().filter(|p| !p.is_empty()) {
            fields.push(("password", password.clone()));
            let confirmation = self.password_confirmation.clone().unwrap_or_default();
            fields.push(("password_confirmation", confirmation));
        }
        fields
    }

    pub fn into_form(self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in self.text_fields() {
            form = form.text(name, value);
        }
        if let Some(avatar) = self.avatar {
            let mut part = Part::bytes(avatar.bytes).file_name(avatar.file_name);
            if let Some(contentType) = avatar.content_type.filter(|c| !c.is_empty()) {
                part = part
                    .mime_str(&contentType)
                    .map_err(|e| ClientError::Encode(format!("invalid avatar content type: {e}")))?;
            }
            form = form.part("avatar", part);
        }
        Ok(form)
    }
}

#[derive(Clone, Debug)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(
        &self,
        page: NonZeroU32,
        search: &str,
    ) -> Result<PaginatedResult<User>, ClientError> {
        let query = [("page", page.to_string()), ("search", search.to_string())];
        let envelope: UsersEnvelope = self.api.get("fetchUsers", &query).await?;
        Ok(envelope.users)
    }

    pub async fn show(&self, id: i64) -> Result<User, ClientError> {
        let envelope: UserEnvelope = self.api.get(&format!("user/show/{id}"), &[]).await?;
        Ok(envelope.user)
    }

    /// Returns the server's confirmation message.
    pub async fn store(&self, payload: UserPayload) -> Result<String, ClientError> {
        let response: MessageResponse =
            self.api.post_multipart("user/store", payload.into_form()?).await?;
        Ok(response.message)
    }

    pub async fn update(&self, id: i64, payload: UserPayload) -> Result<UserUpdated, ClientError> {
        self.api
            .post_multipart(&format!("user/update/{id}"), payload.into_form()?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<String, ClientError> {
        let response: MessageResponse = self.api.delete(&format!("user/delete/{id}")).await?;
        Ok(response.message)
    }
}

#[derive(Clone, Debug)]
pub struct LookupService {
    api: ApiClient,
}

impl LookupService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn genders(&self) -> Result<Vec<Gender>, ClientError> {
        let envelope: GendersEnvelope = self.api.get("fetchGenders", &[]).await?;
        Ok(envelope.genders)
    }

    pub async fn roles(&self) -> Result<Vec<Role>, ClientError> {
        let envelope: RolesEnvelope = self.api.get("fetchRoles", &[]).await?;
        Ok(envelope.roles)
    }
}
