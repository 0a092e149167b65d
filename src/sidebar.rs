use crate::events::{ProfileEvents, ProfileSubscriber, ProfileUpdated, Subscription};
use crate::session::SessionStore;
use serde::Serialize;
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

pub const FALLBACK_USERNAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
}

impl NavEntry {
    pub fn is_active(&self, current_path: &str) -> bool {
        self.path == current_path
    }
}

pub const NAV_ENTRIES: [NavEntry; 4] = [
    NavEntry { label: "Dashboard", path: "/dashboard", icon: "\u{1F3E0}" },
    NavEntry { label: "Game Hub", path: "/game-hub", icon: "\u{1F3AE}" },
    NavEntry { label: "Learning Hub", path: "/learning-hub", icon: "\u{1F4D6}" },
    NavEntry { label: "Profile", path: "/profile", icon: "\u{2699}" },
];

/// Navigation entries paired with whether each is the current page.
pub fn navigation(current_path: &str) -> impl Iterator<Item = (&'static NavEntry, bool)> + '_ {
    NAV_ENTRIES
        .iter()
        .map(move |entry| (entry, entry.is_active(current_path)))
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct SidebarCache {
    pub username: String,
    pub avatar_url: Option<String>,
}

impl SidebarCache {
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            FALLBACK_USERNAME
        } else {
            &self.username
        }
    }
}

pub type LogoutCallback = Arc<dyn Fn() + Send + Sync>;

struct SidebarListener {
    cache: Arc<RwLock<SidebarCache>>,
    session: Arc<SessionStore>,
}

impl ProfileSubscriber for SidebarListener {
    fn on_profile_updated(&self, event: &ProfileUpdated) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = SidebarCache {
            username: event.username.clone(),
            avatar_url: event.avatar_url.clone(),
        };
        self.session.set_username(event.username.clone());
        debug!(username = %event.username, "sidebar refreshed");
    }
}

/// Sidebar state: a cached username/avatar kept in step with profile saves.
pub struct Sidebar {
    cache: Arc<RwLock<SidebarCache>>,
    session: Arc<SessionStore>,
    on_logout: LogoutCallback,
    _subscription: Subscription,
}

impl fmt::Debug for Sidebar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sidebar").field("cache", &self.snapshot()).finish()
    }
}

impl Sidebar {
    /// Hydrates from the session and subscribes for the sidebar's lifetime.
    pub fn mount(session: Arc<SessionStore>, events: &ProfileEvents, on_logout: LogoutCallback) -> Self {
        let cache = Arc::new(RwLock::new(SidebarCache::default()));
        let subscription = events.subscribe(Arc::new(SidebarListener {
            cache: Arc::clone(&cache),
            session: Arc::clone(&session),
        }));
        let sidebar = Self {
            cache,
            session,
            on_logout,
            _subscription: subscription,
        };
        sidebar.hydrate();
        sidebar
    }

    /// Re-reads the username from the session; the avatar starts out unknown.
    pub fn hydrate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = SidebarCache {
            username: self.session.username().unwrap_or_default(),
            avatar_url: None,
        };
    }

    pub fn snapshot(&self) -> SidebarCache {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn logout(&self) {
        (self.on_logout)()
    }
}
