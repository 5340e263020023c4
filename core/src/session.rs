//! Authentication session: the current bearer token and its persistence.
//!
//! # Design
//! `Session` is an explicit object shared through `Arc` by every facade; there
//! is no process-wide token. Changes are published on a broadcast channel so
//! observers (route guards, UI refreshers) react without polling.
//!
//! Persistence goes through `TokenStorage`. Interactive clients use
//! `FileStorage`; server-side or headless contexts use `NoopStorage`, whose
//! reads return nothing and whose writes are dropped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Durable backing store for the session token.
///
/// Implementations must not fail loudly: a storage problem degrades to an
/// unauthenticated start, never to an error.
pub trait TokenStorage: Send + Sync + fmt::Debug {
    fn load(&self) -> Option<String>;
    fn store(&self, token: Option<&str>);
}

/// Storage for non-interactive contexts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl TokenStorage for NoopStorage {
    fn load(&self) -> Option<String> {
        None
    }

    fn store(&self, _token: Option<&str>) {}
}

/// Process-local storage, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, token: Option<&str>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = token.map(str::to_string);
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: Option<String>,
}

/// JSON file holding `{"token": ...}`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read session file");
                return None;
            }
        };
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => stored.token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    fn store(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => {
                let stored = StoredSession {
                    token: Some(token.to_string()),
                };
                serde_json::to_string(&stored)
                    .map_err(std::io::Error::other)
                    .and_then(|json| {
                        if let Some(dir) = self.path.parent() {
                            fs::create_dir_all(dir)?;
                        }
                        fs::write(&self.path, json)
                    })
            }
            None => match fs::remove_file(&self.path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }
}

/// The single source of truth for authentication state.
pub struct Session {
    token: RwLock<Option<String>>,
    storage: Box<dyn TokenStorage>,
    changes: broadcast::Sender<Option<String>>,
}

impl Session {
    /// Restore whatever token `storage` holds.
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        let restored = storage.load();
        if restored.is_some() {
            tracing::debug!("restored persisted session token");
        }
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            token: RwLock::new(restored),
            storage: Box::new(storage),
            changes,
        }
    }

    /// An unauthenticated session that never touches storage.
    pub fn ephemeral() -> Self {
        Self::new(NoopStorage)
    }

    pub fn get_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.store(Some(&token));
        *slot = Some(token.clone());
        // No receivers is fine.
        let _ = self.changes.send(Some(token));
    }

    /// Drop the token. Publishes only when a token was actually present, so
    /// repeated 401s from in-flight requests stay quiet.
    pub fn clear_token(&self) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_none() {
            return;
        }
        self.storage.store(None);
        let _ = self.changes.send(None);
    }

    /// Receive every subsequent token change.
    pub fn subscribe(&self) -> broadcast::Receiver<Option<String>> {
        self.changes.subscribe()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("storage", &self.storage)
            .finish()
    }
}
