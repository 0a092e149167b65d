use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Profile record as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
}

/// Editable copy of a profile plus the write-only password pair.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub profile: UserProfile,
    pub current_password: String,
    pub new_password: String,
}

impl From<UserProfile> for ProfileDraft {
    fn from(profile: UserProfile) -> Self {
        Self {
            profile,
            current_password: String::new(),
            new_password: String::new(),
        }
    }
}

impl fmt::Debug for ProfileDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileDraft")
            .field("profile", &self.profile)
            .field("current_password", &redacted(&self.current_password))
            .field("new_password", &redacted(&self.new_password))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "<redacted>" }
}

/// Avatar picked in the editor, held until the next submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Inline URL used to preview the image before it is uploaded.
    pub fn preview_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Draft fields the editor accepts from form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Username,
    Email,
    Age,
    College,
    CurrentPassword,
    NewPassword,
}

impl ProfileField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Age => "age",
            Self::College => "college",
            Self::CurrentPassword => "currentPassword",
            Self::NewPassword => "newPassword",
        }
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "username" => Ok(Self::Username),
            "email" => Ok(Self::Email),
            "age" => Ok(Self::Age),
            "college" => Ok(Self::College),
            "currentPassword" => Ok(Self::CurrentPassword),
            "newPassword" => Ok(Self::NewPassword),
            other => Err(format!("unknown profile field '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    None,
    Error,
    Success,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == StatusKind::None || self.text.is_empty()
    }
}

/// `{ "user": ... }` wrapper used by both profile endpoints.
#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// JSON view of the profile editor. Never carries password values.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub loaded: bool,
    pub editing: bool,
    pub submitting: bool,
    pub profile: Option<UserProfile>,
    pub draft: Option<UserProfile>,
    pub preview_url: Option<String>,
    pub pending_avatar: Option<String>,
    pub status: StatusMessage,
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdateRequest {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}
