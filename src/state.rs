use crate::backend::ProfileBackend;
use crate::config::Config;
use crate::events::ProfileEvents;
use crate::profile::ProfileService;
use crate::session::SessionStore;
use crate::sidebar::{LogoutCallback, Sidebar};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub events: ProfileEvents,
    pub sidebar: Arc<Sidebar>,
    pub profile: ProfileService,
}

impl AppState {
    pub fn new(config: Config, session: SessionStore, backend: Arc<dyn ProfileBackend>) -> Self {
        let session = Arc::new(session);
        let events = ProfileEvents::new();

        let on_logout: LogoutCallback = {
            let session = Arc::clone(&session);
            Arc::new(move || session.clear())
        };
        let sidebar = Arc::new(Sidebar::mount(Arc::clone(&session), &events, on_logout));
        let profile = ProfileService::new(Arc::clone(&session), events.clone(), backend);

        Self {
            config: Arc::new(config),
            session,
            events,
            sidebar,
            profile,
        }
    }
}
