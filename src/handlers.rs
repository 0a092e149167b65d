use crate::backend::PROFILE_PIC_FIELD;
use crate::dashboard::build_dashboard;
use crate::errors::AppError;
use crate::models::{AvatarFile, FieldUpdateRequest, LoginForm, ProfileField, ProfileView, StatusMessage};
use crate::session::TOKEN_KEY;
use crate::sidebar::SidebarCache;
use crate::state::AppState;
use crate::ui::{render_dashboard, render_hub, render_login, render_page, render_profile};
use axum::{
    Form, Json,
    extract::{Multipart, State},
    response::{Html, Redirect},
};
use tracing::{info, warn};

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let content = render_dashboard(&build_dashboard());
    Html(render_page("Dashboard", "/dashboard", &state.sidebar.snapshot(), &content))
}

pub async fn game_hub(State(state): State<AppState>) -> Html<String> {
    Html(render_page("Game Hub", "/game-hub", &state.sidebar.snapshot(), &render_hub("Game Hub")))
}

pub async fn learning_hub(State(state): State<AppState>) -> Html<String> {
    Html(render_page(
        "Learning Hub",
        "/learning-hub",
        &state.sidebar.snapshot(),
        &render_hub("Learning Hub"),
    ))
}

pub async fn profile_page(State(state): State<AppState>) -> Html<String> {
    state.profile.ensure_loaded().await;
    let content = state.profile.with_editor(|editor| render_profile(editor)).await;
    Html(render_page("Profile", "/profile", &state.sidebar.snapshot(), &content))
}

pub async fn begin_edit(State(state): State<AppState>) -> Redirect {
    state.profile.with_editor(|editor| editor.begin_edit()).await;
    Redirect::to("/profile")
}

pub async fn cancel_edit(State(state): State<AppState>) -> Redirect {
    state.profile.with_editor(|editor| editor.cancel_edit()).await;
    Redirect::to("/profile")
}

pub async fn choose_avatar(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    // Preview posts the whole profile form.
    let input = read_profile_form(multipart).await?;
    state
        .profile
        .with_editor(|editor| input.apply(editor))
        .await;
    Ok(Redirect::to("/profile"))
}

pub async fn save_profile(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let input = read_profile_form(multipart).await?;
    state
        .profile
        .with_editor(|editor| input.apply(editor))
        .await;

    // Failures are already on the editor's status line.
    let _ = state.profile.submit().await;
    Ok(Redirect::to("/profile"))
}

pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileView> {
    state.profile.ensure_loaded().await;
    Json(state.profile.view().await)
}

pub async fn update_field(
    State(state): State<AppState>,
    Json(payload): Json<FieldUpdateRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let field = payload
        .name
        .parse::<ProfileField>()
        .map_err(AppError::bad_request)?;
    state
        .profile
        .with_editor(|editor| editor.update_field(field, &payload.value))
        .await;
    Ok(Json(state.profile.view().await))
}

pub async fn submit_profile(State(state): State<AppState>) -> Json<ProfileView> {
    let _ = state.profile.submit().await;
    Json(state.profile.view().await)
}

pub async fn get_sidebar(State(state): State<AppState>) -> Json<SidebarCache> {
    Json(state.sidebar.snapshot())
}

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    let content = render_login(&StatusMessage::default());
    Html(render_page("Sign in", "/login", &state.sidebar.snapshot(), &content))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let token = form.token.trim();
    let email = form.email.trim();
    if token.is_empty() || email.is_empty() {
        return Err(AppError::bad_request("token and email are required"));
    }

    state.session.clear();
    state.session.set(TOKEN_KEY, token);
    state.session.set_user_email(email);
    if let Some(username) = form.username.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
        state.session.set_username(username);
    }
    state.session.save().await?;

    state.profile.reset().await;
    state.sidebar.hydrate();
    info!(%email, "session started");
    Ok(Redirect::to("/profile"))
}

pub async fn logout(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.sidebar.logout();
    state.session.save().await?;

    state.profile.reset().await;
    state.sidebar.hydrate();
    info!("session ended");
    Ok(Redirect::to("/login"))
}

/// Editable fields and the optional avatar read from a multipart form.
#[derive(Debug, Default)]
struct ProfileFormInput {
    fields: Vec<(ProfileField, String)>,
    avatar: Option<AvatarFile>,
}

impl ProfileFormInput {
    fn apply(self, editor: &mut crate::profile::ProfileEditor) {
        for (field, value) in &self.fields {
            editor.update_field(*field, value);
        }
        if let Some(file) = self.avatar {
            editor.choose_avatar_file(file);
        }
    }
}

async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileFormInput, AppError> {
    let mut input = ProfileFormInput::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == PROFILE_PIC_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was picked.
            if !file_name.is_empty() && !bytes.is_empty() {
                input.avatar = Some(AvatarFile::new(file_name, content_type, bytes.to_vec()));
            }
            continue;
        }

        match name.parse::<ProfileField>() {
            Ok(profile_field) => input.fields.push((profile_field, field.text().await?)),
            Err(message) => warn!("ignoring form input: {message}"),
        }
    }
    Ok(input)
}
