pub mod app;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod session;
pub mod sidebar;
pub mod state;
pub mod ui;

pub use app::router;
pub use backend::{HttpProfileBackend, ProfileBackend};
pub use config::Config;
pub use events::{ProfileEvents, ProfileUpdated, Subscription};
pub use profile::{ProfileEditor, ProfileService};
pub use session::SessionStore;
pub use state::AppState;
