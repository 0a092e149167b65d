use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Upper bound for form bodies, which may carry an avatar image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/dashboard", get(handlers::dashboard))
        .route("/game-hub", get(handlers::game_hub))
        .route("/learning-hub", get(handlers::learning_hub))
        .route("/profile", get(handlers::profile_page))
        .route("/profile/edit", post(handlers::begin_edit))
        .route("/profile/cancel", post(handlers::cancel_edit))
        .route("/profile/avatar", post(handlers::choose_avatar))
        .route("/profile/save", post(handlers::save_profile))
        .route("/api/profile", get(handlers::get_profile))
        .route("/api/profile/field", post(handlers::update_field))
        .route("/api/profile/submit", post(handlers::submit_profile))
        .route("/api/sidebar", get(handlers::get_sidebar))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", post(handlers::logout))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
