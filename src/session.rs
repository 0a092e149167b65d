//! Durable session state: the auth token, the active profile's email and the
//! cached username. One store owns all three keys.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

pub const TOKEN_KEY: &str = "token";
pub const USER_EMAIL_KEY: &str = "userEmail";
pub const USERNAME_KEY: &str = "username";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionData {
    entries: BTreeMap<String, String>,
}

impl SessionData {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_owned(), value.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Token and email needed to address the profile resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub email: String,
}

#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    data: RwLock<SessionData>,
    // Held for the whole snapshot-and-write so files land in snapshot order.
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Reads the session file. A missing or unreadable file yields an empty session.
    pub async fn load(path: PathBuf) -> Self {
        let data = load_data(&path).await;
        Self {
            path: Some(path),
            data: RwLock::new(data),
            write_lock: Mutex::new(()),
        }
    }

    /// A store that is never written to disk.
    pub fn in_memory(data: SessionData) -> Self {
        Self {
            path: None,
            data: RwLock::new(data),
            write_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read()
            .get(key)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.write().set(key, value);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    pub fn user_email(&self) -> Option<String> {
        self.get(USER_EMAIL_KEY)
    }

    pub fn username(&self) -> Option<String> {
        self.get(USERNAME_KEY)
    }

    pub fn set_user_email(&self, email: impl Into<String>) {
        self.set(USER_EMAIL_KEY, email);
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.set(USERNAME_KEY, username);
    }

    /// Both the token and the email, or `None` if either is missing or empty.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            token: self.token()?,
            email: self.user_email()?,
        })
    }

    pub fn snapshot(&self) -> SessionData {
        self.read().clone()
    }

    /// Writes the current entries to the backing file, if any.
    pub async fn save(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _write = self.write_lock.lock().await;
        let snapshot = self.snapshot();
        persist_data(path, &snapshot).await?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn load_data(path: &Path) -> SessionData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse session file: {err}");
                SessionData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
        Err(err) => {
            error!("failed to read session file: {err}");
            SessionData::default()
        }
    }
}

async fn persist_data(path: &Path, data: &SessionData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
