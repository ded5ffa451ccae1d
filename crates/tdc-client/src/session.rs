//! Session Store.
//!
//! Holds the access token and the signed-in profile. A [`SessionStore`] is an
//! explicitly scoped handle passed to every client; clones share state. Every
//! write is mirrored to an optional [`SessionPersistence`] so a restarted
//! process resumes the session.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tdc_types::{UserProfile, VideoSubmission};
use thiserror::Error;
use tokio::sync::watch;

use crate::guard::AccessState;

/// The live session of one client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_cleared(&self) -> bool {
        self.access_token.is_none() && self.user.is_none()
    }
}

/// Failures of the durable session mirror.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session file I/O failed ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file is corrupt ({path}): {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable mirror of the session.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Stores the session as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SessionStoreError {
        SessionStoreError::Io { path: self.path.clone(), source }
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        let session = serde_json::from_str(&content)
            .map_err(|source| SessionStoreError::Corrupt { path: self.path.clone(), source })?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        if session.is_cleared() {
            return self.clear();
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let content = serde_json::to_string_pretty(session)
            .map_err(|source| SessionStoreError::Corrupt { path: self.path.clone(), source })?;
        fs::write(&self.path, content).map_err(|e| self.io_err(e))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// In-memory mirror, handy for tests.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    saved: Mutex<Option<Session>>,
}

impl MemorySessionPersistence {
    pub fn saved(&self) -> Option<Session> {
        self.saved.lock().clone()
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.saved.lock() = (!session.is_cleared()).then(|| session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.saved.lock() = None;
        Ok(())
    }
}

struct StoreInner {
    state: watch::Sender<Session>,
    persistence: Option<Arc<dyn SessionPersistence>>,
}

/// Shared handle to the session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.snapshot();
        f.debug_struct("SessionStore")
            .field("has_token", &session.access_token.is_some())
            .field("user", &session.user.as_ref().map(|u| u.email.clone()))
            .finish()
    }
}

impl SessionStore {
    /// Empty, non-persistent store.
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { inner: Arc::new(StoreInner { state, persistence: None }) }
    }

    /// Store mirrored to `persistence`, restoring whatever it holds.
    ///
    /// A corrupt or unreadable mirror starts an empty session instead of failing.
    pub fn with_persistence(persistence: Arc<dyn SessionPersistence>) -> Self {
        let initial = match persistence.load() {
            Ok(session) => session.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Discarding persisted session: {}", e);
                Session::default()
            },
        };
        let (state, _) = watch::channel(initial);
        Self { inner: Arc::new(StoreInner { state, persistence: Some(persistence) }) }
    }

    // ===== selectors =====

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state.borrow().access_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().access_token.is_some()
    }

    pub fn access_state(&self) -> AccessState {
        AccessState::of(&self.inner.state.borrow())
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    // ===== writes =====

    /// Install a fresh token and profile after login or refresh.
    pub fn set_credentials(&self, access_token: String, user: UserProfile) {
        tracing::info!("Session established for {}", user.email);
        self.modify(|session| {
            session.access_token = Some(access_token);
            session.user = Some(user);
            true
        });
    }

    /// Drop token and profile.
    pub fn clear(&self) {
        let changed = self.modify(|session| {
            let had_state = !session.is_cleared();
            *session = Session::default();
            had_state
        });
        if changed {
            tracing::info!("Session cleared");
        }
    }

    /// Drop the access token only if it is still `stale`.
    ///
    /// Returns whether the token was cleared. A token that has already been
    /// replaced by a refresh is left alone.
    pub fn clear_token_if(&self, stale: &str) -> bool {
        self.modify(|session| {
            if session.access_token.as_deref() == Some(stale) {
                session.access_token = None;
                true
            } else {
                false
            }
        })
    }

    /// Edit the profile in place. No-op without a profile.
    pub fn update_user(&self, f: impl FnOnce(&mut UserProfile)) -> bool {
        self.modify(|session| match session.user.as_mut() {
            Some(user) => {
                f(user);
                true
            },
            None => false,
        })
    }

    /// Replace the profile with an authoritative copy from the server.
    pub fn set_user(&self, user: UserProfile) {
        self.modify(|session| {
            session.user = Some(user);
            true
        });
    }

    pub fn mark_email_verified(&self) -> bool {
        self.update_user(|user| user.email_verified = true)
    }

    pub fn append_video(&self, video: VideoSubmission) -> bool {
        self.update_user(|user| user.videos.push(video))
    }

    pub fn freeze_video(&self) -> bool {
        self.update_user(|user| user.video_freeze = true)
    }

    fn modify(&self, f: impl FnOnce(&mut Session) -> bool) -> bool {
        let changed = self.inner.state.send_if_modified(f);
        if changed {
            self.mirror();
        }
        changed
    }

    fn mirror(&self) {
        let Some(persistence) = &self.inner.persistence else {
            return;
        };
        let session = self.snapshot();
        let result =
            if session.is_cleared() { persistence.clear() } else { persistence.save(&session) };
        if let Err(e) = result {
            tracing::warn!("Failed to mirror session: {}", e);
        }
    }
}
