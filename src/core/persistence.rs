//! Durable per-user storage for conversation history.
//!
//! History is kept as one JSON blob per user under a namespaced key. The
//! [`DurableStore`] trait abstracts the slot storage so the conversation store
//! can run against the filesystem in the binary and against memory in tests.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use directories::ProjectDirs;
use tempfile::NamedTempFile;

use crate::core::config::data::path_display;
use crate::core::conversation::Conversation;

/// Key of the durable slot holding `user_id`'s history.
pub fn storage_key(user_id: &str) -> String {
    format!("chatHistory_{user_id}")
}

#[derive(Debug)]
pub enum PersistenceError {
    /// Reading or writing a slot failed.
    Io { path: PathBuf, source: io::Error },
    /// A slot exists but does not hold a history this version understands.
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    /// The in-memory history could not be serialized.
    Encode(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Io { path, source } => {
                write!(f, "History I/O failed at {}: {}", path_display(path), source)
            }
            PersistenceError::Corrupt { key, source } => {
                write!(f, "History slot '{key}' is unreadable: {source}")
            }
            PersistenceError::Encode(source) => write!(f, "Failed to encode history: {source}"),
        }
    }
}

impl StdError for PersistenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistenceError::Io { source, .. } => Some(source),
            PersistenceError::Corrupt { source, .. } => Some(source),
            PersistenceError::Encode(source) => Some(source),
        }
    }
}

pub trait DurableStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, blob: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

pub fn encode_history(conversations: &[Conversation]) -> Result<String, PersistenceError> {
    serde_json::to_string(conversations).map_err(PersistenceError::Encode)
}

pub fn decode_history(key: &str, blob: &str) -> Result<Vec<Conversation>, PersistenceError> {
    serde_json::from_str(blob).map_err(|source| PersistenceError::Corrupt {
        key: key.to_string(),
        source,
    })
}

/// Percent-escapes every byte outside `[A-Za-z0-9_-]`. `%` is always
/// escaped, so distinct keys never share a file.
fn file_stem_for(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

/// Stores each slot as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `history/` under the platform data directory.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "parley", "parley").map(|dirs| dirs.data_dir().join("history"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem_for(key)))
    }

    fn write_atomically(&self, path: &Path, blob: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(blob.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        self.write_atomically(&path, blob)
            .map_err(|source| PersistenceError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }
}

/// In-memory slots. Clones share the same slots, so a caller can keep a
/// handle for inspection after handing one to the conversation store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(self, key: impl Into<String>, blob: impl Into<String>) -> Self {
        self.lock().insert(key.into(), blob.into());
        self
    }

    pub fn slot(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.slot(key))
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), PersistenceError> {
        self.lock().insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.lock().remove(key);
        Ok(())
    }
}
