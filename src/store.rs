use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::Character;
use crate::error::StoreError;

const CHARACTERS_LOADED_FIELD: &str = "is_character_loaded";

pub type StoredSets = HashMap<String, String>;

/// Key/value persistence used by the pipeline. Sets are stored as one hash per
/// event, characters as one hash per game title.
pub trait UpsetStore: Send + Sync {
    fn add_sets(&self, event_slug: &str, sets: &StoredSets) -> Result<(), StoreError>;
    fn get_sets(&self, event_slug: &str) -> Result<StoredSets, StoreError>;
    fn is_characters_loaded(&self, game: &str) -> Result<bool, StoreError>;
    fn add_characters(&self, game: &str, characters: &[Character]) -> Result<(), StoreError>;
    fn set_characters_loaded(&self, game: &str) -> Result<(), StoreError>;
    fn character_name(&self, id: i64, game: &str) -> Result<Option<String>, StoreError>;

    /// Held across check-fetch-populate of a roster, so every cache over this
    /// store fetches a title at most once.
    fn roster_lock(&self) -> &Mutex<()>;
}

pub fn sets_key(event_slug: &str) -> String {
    format!("event:{event_slug}_sets")
}

pub fn characters_key(game: &str) -> String {
    format!("characters:{game}")
}

pub fn character_field(id: i64) -> String {
    format!("character:{id}")
}

type Hashes = HashMap<String, HashMap<String, String>>;

fn hset_all(hashes: &mut Hashes, key: String, fields: impl IntoIterator<Item = (String, String)>) {
    hashes.entry(key).or_default().extend(fields);
}

fn hget(hashes: &Hashes, key: &str, field: &str) -> Option<String> {
    hashes.get(key).and_then(|hash| hash.get(field)).cloned()
}

/// Redis-shaped hashes held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hashes: Mutex<Hashes>,
    roster_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_hashes<T>(&self, f: impl FnOnce(&mut Hashes) -> T) -> Result<T, StoreError> {
        let mut guard = self.hashes.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut guard))
    }
}

impl UpsetStore for MemoryStore {
    fn add_sets(&self, event_slug: &str, sets: &StoredSets) -> Result<(), StoreError> {
        self.with_hashes(|hashes| {
            hset_all(hashes, sets_key(event_slug), sets.clone());
        })
    }

    fn get_sets(&self, event_slug: &str) -> Result<StoredSets, StoreError> {
        self.with_hashes(|hashes| hashes.get(&sets_key(event_slug)).cloned().unwrap_or_default())
    }

    fn is_characters_loaded(&self, game: &str) -> Result<bool, StoreError> {
        self.with_hashes(|hashes| {
            hget(hashes, &characters_key(game), CHARACTERS_LOADED_FIELD).as_deref() == Some("1")
        })
    }

    fn add_characters(&self, game: &str, characters: &[Character]) -> Result<(), StoreError> {
        self.with_hashes(|hashes| {
            let fields = characters
                .iter()
                .map(|character| (character_field(character.id), character.name.clone()));
            hset_all(hashes, characters_key(game), fields);
        })
    }

    fn set_characters_loaded(&self, game: &str) -> Result<(), StoreError> {
        self.with_hashes(|hashes| {
            hset_all(
                hashes,
                characters_key(game),
                [(CHARACTERS_LOADED_FIELD.to_string(), "1".to_string())],
            );
        })
    }

    fn character_name(&self, id: i64, game: &str) -> Result<Option<String>, StoreError> {
        self.with_hashes(|hashes| hget(hashes, &characters_key(game), &character_field(id)))
    }

    fn roster_lock(&self) -> &Mutex<()> {
        &self.roster_lock
    }
}

/// `MemoryStore` persisted to a JSON file after every write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let hashes: Hashes = if path.is_file() {
            let data = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            serde_json::from_str(&data).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            Hashes::new()
        };
        tracing::debug!(path = %path.display(), keys = hashes.len(), "opened store");
        Ok(Self {
            path,
            inner: MemoryStore {
                hashes: Mutex::new(hashes),
                roster_lock: Mutex::new(()),
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let payload = self
            .inner
            .with_hashes(|hashes| serde_json::to_string_pretty(hashes))?
            .map_err(|e| StoreError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
        }
        fs::write(&self.path, payload).map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl UpsetStore for JsonFileStore {
    fn add_sets(&self, event_slug: &str, sets: &StoredSets) -> Result<(), StoreError> {
        self.inner.add_sets(event_slug, sets)?;
        self.flush()
    }

    fn get_sets(&self, event_slug: &str) -> Result<StoredSets, StoreError> {
        self.inner.get_sets(event_slug)
    }

    fn is_characters_loaded(&self, game: &str) -> Result<bool, StoreError> {
        self.inner.is_characters_loaded(game)
    }

    fn add_characters(&self, game: &str, characters: &[Character]) -> Result<(), StoreError> {
        self.inner.add_characters(game, characters)?;
        self.flush()
    }

    fn set_characters_loaded(&self, game: &str) -> Result<(), StoreError> {
        self.inner.set_characters_loaded(game)?;
        self.flush()
    }

    fn character_name(&self, id: i64, game: &str) -> Result<Option<String>, StoreError> {
        self.inner.character_name(id, game)
    }

    fn roster_lock(&self) -> &Mutex<()> {
        self.inner.roster_lock()
    }
}
