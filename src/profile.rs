//! Profile editor: the authoritative profile, its editable draft, and the
//! load / edit / submit cycle against the backend.

use crate::backend::{ProfileBackend, ProfileUpdate, display_url};
use crate::errors::{BackendError, ProfileError};
use crate::events::{ProfileEvents, ProfileUpdated};
use crate::models::{AvatarFile, ProfileDraft, ProfileField, ProfileView, StatusMessage, UserProfile};
use crate::session::{Credentials, SessionStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch user data";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update profile";
pub const UPDATE_SUCCESS_MESSAGE: &str = "Profile updated successfully!";

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    /// Another submit was still outstanding; nothing was sent.
    InFlight,
}

/// A submit that passed local checks and is ready to be sent.
#[derive(Debug)]
pub struct PendingSubmit {
    pub credentials: Credentials,
    pub update: ProfileUpdate,
}

#[derive(Debug)]
pub struct ProfileEditor {
    origin: String,
    profile: Option<UserProfile>,
    draft: Option<ProfileDraft>,
    editing: bool,
    submitting: bool,
    avatar_file: Option<AvatarFile>,
    preview_url: Option<String>,
    status: StatusMessage,
}

impl ProfileEditor {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            profile: None,
            draft: None,
            editing: false,
            submitting: false,
            avatar_file: None,
            preview_url: None,
            status: StatusMessage::default(),
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.profile.is_some() && self.draft.is_some()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn avatar_file(&self) -> Option<&AvatarFile> {
        self.avatar_file.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn view(&self) -> ProfileView {
        ProfileView {
            loaded: self.is_loaded(),
            editing: self.editing,
            submitting: self.submitting,
            profile: self.profile.clone(),
            draft: self.draft.as_ref().map(|draft| draft.profile.clone()),
            preview_url: self.preview_url.clone(),
            pending_avatar: self.avatar_file.as_ref().map(|file| file.file_name.clone()),
            status: self.status.clone(),
        }
    }

    /// Checks that a load can be attempted and clears the previous status.
    /// Sets the error status when credentials are missing.
    pub fn prepare_load(&mut self, session: &SessionStore) -> Result<Credentials, ProfileError> {
        self.status = StatusMessage::default();
        session.credentials().ok_or_else(|| {
            let err = ProfileError::AuthRequired;
            self.status = StatusMessage::error(err.to_string());
            err
        })
    }

    pub fn finish_load(
        &mut self,
        result: Result<UserProfile, BackendError>,
    ) -> Result<UserProfile, ProfileError> {
        match result {
            Ok(profile) => {
                if let Some(path) = &profile.profile_pic {
                    self.preview_url = Some(display_url(&self.origin, path));
                }
                self.draft = Some(ProfileDraft::from(profile.clone()));
                self.profile = Some(profile.clone());
                Ok(profile)
            }
            Err(err) => {
                let failure = match &err {
                    BackendError::Status { status: 404, .. } => ProfileError::NotFound,
                    BackendError::Status { status: 401, .. } => ProfileError::AuthExpired,
                    other => ProfileError::FetchFailed(
                        other.server_message().unwrap_or(FETCH_FAILED_MESSAGE).to_owned(),
                    ),
                };
                warn!("failed to fetch profile: {err}");
                self.status = StatusMessage::error(failure.to_string());
                Err(failure)
            }
        }
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Applies form input to the draft. Returns `false` before the first load.
    pub fn update_field(&mut self, field: ProfileField, value: &str) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        match field {
            ProfileField::Username => draft.profile.username = value.to_owned(),
            ProfileField::Email => draft.profile.email = value.to_owned(),
            ProfileField::Age => draft.profile.age = parse_age(value),
            ProfileField::College => {
                draft.profile.college = (!value.is_empty()).then(|| value.to_owned())
            }
            ProfileField::CurrentPassword => draft.current_password = value.to_owned(),
            ProfileField::NewPassword => draft.new_password = value.to_owned(),
        }
        true
    }

    pub fn choose_avatar_file(&mut self, file: AvatarFile) {
        self.preview_url = Some(file.preview_url());
        self.avatar_file = Some(file);
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.draft = self.profile.clone().map(ProfileDraft::from);
        self.preview_url = self.authoritative_avatar_url();
        self.avatar_file = None;
        self.status = StatusMessage::default();
    }

    /// Validates local state and marks a submit as in flight.
    ///
    /// Returns `Ok(None)` when a previous submit has not finished yet.
    pub fn prepare_submit(
        &mut self,
        session: &SessionStore,
    ) -> Result<Option<PendingSubmit>, ProfileError> {
        if self.submitting {
            return Ok(None);
        }
        self.status = StatusMessage::default();

        let credentials = session.credentials();
        let update = self
            .draft
            .as_ref()
            .map(|draft| ProfileUpdate::from_draft(draft, self.avatar_file.clone()));
        let (Some(credentials), Some(update)) = (credentials, update) else {
            let err = ProfileError::MissingPrerequisite;
            self.status = StatusMessage::error(err.to_string());
            return Err(err);
        };

        self.submitting = true;
        Ok(Some(PendingSubmit { credentials, update }))
    }

    /// Clears the in-flight flag when a submit ended without an answer.
    pub fn abort_submit(&mut self) -> ProfileError {
        self.submitting = false;
        self.status = StatusMessage::error(UPDATE_FAILED_MESSAGE);
        ProfileError::UpdateFailed(UPDATE_FAILED_MESSAGE.to_owned())
    }

    /// Applies the backend's answer to a submit. On success the session and the
    /// notification channel are updated before this returns.
    pub fn finish_submit(
        &mut self,
        result: Result<UserProfile, BackendError>,
        session: &SessionStore,
        events: &ProfileEvents,
    ) -> Result<UserProfile, ProfileError> {
        self.submitting = false;
        let profile = match result {
            Ok(profile) => profile,
            Err(err) => {
                error!("failed to update profile: {err}");
                let message = err.server_message().unwrap_or(UPDATE_FAILED_MESSAGE).to_owned();
                self.status = StatusMessage::error(message.clone());
                return Err(ProfileError::UpdateFailed(message));
            }
        };

        // A fresh draft from the server record also clears both password fields.
        self.draft = Some(ProfileDraft::from(profile.clone()));
        self.profile = Some(profile.clone());
        self.avatar_file = None;
        self.preview_url = self.authoritative_avatar_url();
        self.status = StatusMessage::success(UPDATE_SUCCESS_MESSAGE);
        self.editing = false;

        session.set_user_email(profile.email.clone());
        session.set_username(profile.username.clone());
        events.publish(&ProfileUpdated {
            username: profile.username.clone(),
            avatar_url: self.preview_url.clone(),
        });

        info!(username = %profile.username, "profile updated");
        Ok(profile)
    }

    fn authoritative_avatar_url(&self) -> Option<String> {
        self.profile
            .as_ref()
            .and_then(|profile| profile.profile_pic.as_deref())
            .map(|path| display_url(&self.origin, path))
    }
}

/// Number input as text: empty or non-numeric input is no age at all.
/// Leading digits are honoured so `"25.5"` reads as 25.
pub fn parse_age(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..digits_end].parse().ok()
}

/// Shared handle that sequences editor state around backend calls.
///
/// The editor lock is never held across a request, so a second submit while
/// one is outstanding sees the in-flight flag and returns immediately.
#[derive(Clone)]
pub struct ProfileService {
    editor: Arc<Mutex<ProfileEditor>>,
    session: Arc<SessionStore>,
    events: ProfileEvents,
    backend: Arc<dyn ProfileBackend>,
}

impl ProfileService {
    pub fn new(session: Arc<SessionStore>, events: ProfileEvents, backend: Arc<dyn ProfileBackend>) -> Self {
        let editor = ProfileEditor::new(backend.origin());
        Self {
            editor: Arc::new(Mutex::new(editor)),
            session,
            events,
            backend,
        }
    }

    pub async fn load(&self) -> Result<UserProfile, ProfileError> {
        let credentials = self.editor.lock().await.prepare_load(&self.session)?;
        let result = self
            .backend
            .fetch_profile(&credentials.token, &credentials.email)
            .await;
        self.editor.lock().await.finish_load(result)
    }

    /// Loads the profile the first time the page is shown after a session
    /// starts. Later visits keep the editor state, including an open draft.
    pub async fn ensure_loaded(&self) {
        if self.editor.lock().await.is_loaded() {
            return;
        }
        let _ = self.load().await;
    }

    /// Sends the draft. The request and the state update run on their own
    /// task, so a caller that stops waiting cannot leave the editor marked as
    /// submitting once the backend has answered.
    pub async fn submit(&self) -> Result<SubmitOutcome, ProfileError> {
        let pending = self.editor.lock().await.prepare_submit(&self.session)?;
        let Some(PendingSubmit { credentials, update }) = pending else {
            return Ok(SubmitOutcome::InFlight);
        };

        let service = self.clone();
        let task = tokio::spawn(async move {
            let result = service
                .backend
                .update_profile(&credentials.token, &credentials.email, update)
                .await;
            service
                .editor
                .lock()
                .await
                .finish_submit(result, &service.session, &service.events)?;

            if let Err(err) = service.session.save().await {
                error!("failed to persist session after profile update: {}", err.message);
            }
            Ok::<_, ProfileError>(SubmitOutcome::Saved)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("profile update task failed: {err}");
                Err(self.editor.lock().await.abort_submit())
            }
        }
    }

    /// Runs `f` against the editor under its lock.
    pub async fn with_editor<R>(&self, f: impl FnOnce(&mut ProfileEditor) -> R) -> R {
        let mut editor = self.editor.lock().await;
        f(&mut editor)
    }

    pub async fn view(&self) -> ProfileView {
        self.editor.lock().await.view()
    }

    /// Drops all editor state, as when the page is torn down at logout.
    pub async fn reset(&self) {
        *self.editor.lock().await = ProfileEditor::new(self.backend.origin());
    }
}
