//! Client side of the external profile service.

use crate::errors::BackendError;
use crate::models::{AvatarFile, ErrorBody, ProfileDraft, ProfileEnvelope, UserProfile};
use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};
use std::fmt;
use tracing::{debug, warn};

pub const PROFILE_PIC_FIELD: &str = "profilePic";

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    /// Origin that relative avatar paths are resolved against.
    fn origin(&self) -> &str;

    async fn fetch_profile(&self, token: &str, email: &str) -> Result<UserProfile, BackendError>;

    async fn update_profile(
        &self,
        token: &str,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<UserProfile, BackendError>;
}

/// Turns a backend-relative avatar path into a displayable URL.
pub fn display_url(origin: &str, path: &str) -> String {
    format!("{origin}{path}")
}

/// Multipart body of a profile update, in submission order.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub fields: Vec<(&'static str, String)>,
    pub avatar: Option<AvatarFile>,
}

impl ProfileUpdate {
    /// Password fields are sent only as a pair; a lone one is dropped.
    pub fn from_draft(draft: &ProfileDraft, avatar: Option<AvatarFile>) -> Self {
        let profile = &draft.profile;
        let mut fields = vec![
            ("username", profile.username.clone()),
            ("email", profile.email.clone()),
        ];
        if let Some(age) = profile.age.filter(|age| *age > 0) {
            fields.push(("age", age.to_string()));
        }
        if let Some(college) = profile.college.as_ref().filter(|college| !college.is_empty()) {
            fields.push(("college", college.clone()));
        }

        let has_current = !draft.current_password.is_empty();
        let has_new = !draft.new_password.is_empty();
        if has_current && has_new {
            fields.push(("currentPassword", draft.current_password.clone()));
            fields.push(("newPassword", draft.new_password.clone()));
        } else if has_current || has_new {
            warn!("only one password field filled in; password change skipped");
        }

        Self { fields, avatar }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|(name, _)| *name).collect();
        f.debug_struct("ProfileUpdate")
            .field("fields", &names)
            .field("avatar", &self.avatar.as_ref().map(|file| &file.file_name))
            .finish()
    }
}

/// `reqwest` implementation talking to `{origin}/api/user/profile/{email}`.
#[derive(Debug, Clone)]
pub struct HttpProfileBackend {
    client: Client,
    origin: String,
}

impl HttpProfileBackend {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            origin: origin.into(),
        }
    }

    fn profile_url(&self, email: &str) -> String {
        format!("{}/api/user/profile/{}", self.origin, urlencoding::encode(email))
    }
}

#[async_trait]
impl ProfileBackend for HttpProfileBackend {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn fetch_profile(&self, token: &str, email: &str) -> Result<UserProfile, BackendError> {
        let url = self.profile_url(email);
        debug!(%url, "fetching profile");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        read_profile(response).await
    }

    async fn update_profile(
        &self,
        token: &str,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let url = self.profile_url(email);
        debug!(%url, ?update, "updating profile");

        let mut form = Form::new();
        for (name, value) in update.fields {
            form = form.text(name, value);
        }
        if let Some(avatar) = update.avatar {
            let part = Part::bytes(avatar.bytes)
                .file_name(avatar.file_name)
                .mime_str(&avatar.content_type)?;
            form = form.part(PROFILE_PIC_FIELD, part);
        }

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        read_profile(response).await
    }
}

async fn read_profile(response: Response) -> Result<UserProfile, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message);
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ProfileEnvelope = response.json().await?;
    Ok(envelope.user)
}
