//! Session token storage.
//!
//! The dispatcher never owns the token. It reads it through [`TokenStore`]
//! on every call, and login/logout write it through the same handle, so a
//! request issued after logout can only ever see an empty store.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{ClientConfig, Secret};

/// Errors raised when the token store cannot be written.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("token store I/O error at {path}: {source}")]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The backing file is not a JSON object of strings.
    #[error("token store at {path} is corrupt: {source}")]
    Corrupt {
        /// Backing file
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },
}

/// Shared, externally-owned session token.
///
/// Every method is a single atomic access. Implementations must be cheap to
/// call; the dispatcher calls [`get`](Self::get) once per request.
pub trait TokenStore: Send + Sync {
    /// The current token, if a session exists.
    fn get(&self) -> Option<Secret<String>>;

    /// Stores a token written at login.
    fn set(&self, token: Secret<String>) -> Result<(), StoreError>;

    /// Removes the token at logout.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: TokenStore + ?Sized> TokenStore for Arc<S> {
    fn get(&self) -> Option<Secret<String>> {
        (**self).get()
    }

    fn set(&self, token: Secret<String>) -> Result<(), StoreError> {
        (**self).set(token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// In-process token store.
///
/// Clones share the same slot, so a clone handed to the auth flow and a
/// clone handed to the dispatcher always agree.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<RwLock<Option<Secret<String>>>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(Secret::new(token.into())))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<Secret<String>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .map(|token| Secret::new(token.expose_secret().clone()))
    }

    fn set(&self, token: Secret<String>) -> Result<(), StoreError> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Token store persisted to a JSON key/value file.
///
/// The file holds a flat object of string values, the same shape a browser
/// keeps in local storage, so other keys written by the host application
/// survive login and logout. The token lives under the configured key.
///
/// Any number of stores in one process may share a file: writes to the same
/// path are serialized process-wide. Sharing a file between processes is not
/// supported; the last writer wins.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    /// Opens (lazily) the store at `path`, keeping the token under `key`.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Opens the store at `path` under the configured token key
    /// (`COMMERCE_AUTH_TOKEN_KEY` when built from the environment).
    pub fn from_config(path: impl Into<PathBuf>, config: &ClientConfig) -> Self {
        Self::new(path, config.token_key())
    }

    /// Key the token is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Uniquely named sibling, then rename: readers never see a torn file.
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(|e| self.io_err(e))?;
        tmp.write_all(&body).map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        fs::create_dir_all(self.dir()).map_err(|e| self.io_err(e))?;

        let lock = path_lock(&self.path);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        f(&mut entries);
        self.persist(&entries)
    }
}

/// Process-wide write lock for one backing file.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let lock = Arc::clone(locks.entry(lock_key(path)).or_default());
    lock
}

// The file may not exist yet, so resolve its directory instead.
fn lock_key(path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    fs::canonicalize(parent)
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Secret<String>> {
        match self.load() {
            Ok(mut entries) => entries
                .remove(&self.key)
                .filter(|token| !token.is_empty())
                .map(Secret::new),
            Err(err) => {
                // An unreadable store is an unauthenticated session, not a failed request.
                tracing::warn!(error = %err, "token store unreadable; sending request without credentials");
                None
            }
        }
    }

    fn set(&self, token: Secret<String>) -> Result<(), StoreError> {
        let key = self.key.clone();
        self.update(move |entries| {
            entries.insert(key, token.expose_secret().clone());
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let key = self.key.clone();
        self.update(move |entries| {
            entries.remove(&key);
        })
    }
}
