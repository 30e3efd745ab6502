use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// A JSON document persisted at a fixed path.
///
/// A missing, unreadable, or malformed file is replaced by the default
/// document and written straight back, so a first run (or a corrupted
/// store) self-initializes instead of failing.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    doc: T,
}

impl<T: Serialize + DeserializeOwned + Default> JsonStore<T> {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (doc, needs_init) = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(doc) => (doc, false),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        "store file is malformed ({error}), resetting to empty"
                    );
                    (T::default(), true)
                }
            },
            Err(_) => (T::default(), true),
        };

        let store = Self { path, doc };
        if needs_init {
            store.write()?;
        }
        Ok(store)
    }

    pub fn reload(&mut self) -> Result<()> {
        let reloaded = Self::load(self.path.clone())?;
        self.doc = reloaded.doc;
        Ok(())
    }

    /// Serializes the document back to its path, pretty-printed. Writes to
    /// a sibling temp file first and renames, so a crash mid-write cannot
    /// truncate the store.
    pub fn write(&self) -> Result<()> {
        let payload = serde_json::to_string_pretty(&self.doc)
            .with_context(|| format!("failed to serialize {}", self.path.display()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, payload)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn doc(&self) -> &T {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut T {
        &mut self.doc
    }
}

/// User-defined words mapped to their expansion text.
#[derive(Debug)]
pub struct CustomWordStore {
    store: JsonStore<BTreeMap<String, String>>,
}

impl CustomWordStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::load(path.as_ref().to_path_buf())?,
        })
    }

    pub fn reload(&mut self) -> Result<()> {
        self.store.reload()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.store.doc().contains_key(word)
    }

    pub fn expansion(&self, word: &str) -> Option<&str> {
        self.store.doc().get(word).map(String::as_str)
    }

    pub fn insert(&mut self, word: &str, expansion: &str) -> Result<()> {
        self.store
            .doc_mut()
            .insert(word.to_string(), expansion.to_string());
        self.store.write()
    }

    pub fn words(&self) -> impl Iterator<Item = &String> {
        self.store.doc().keys()
    }
}

/// Per-word usage counts, bumped on every accepted suggestion.
#[derive(Debug)]
pub struct HistoryStore {
    store: JsonStore<BTreeMap<String, u64>>,
}

impl HistoryStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::load(path.as_ref().to_path_buf())?,
        })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.store.doc().contains_key(word)
    }

    pub fn count(&self, word: &str) -> u64 {
        self.store.doc().get(word).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, word: &str) -> Result<()> {
        let entry = self.store.doc_mut().entry(word.to_string()).or_insert(0);
        *entry += 1;
        self.store.write()
    }

    pub fn remove(&mut self, word: &str) -> Result<()> {
        if self.store.doc_mut().remove(word).is_none() {
            return Ok(());
        }
        self.store.write()
    }
}

/// Words excluded from every suggestion source. Stored as a JSON array,
/// insertion order preserved, but treated as a set.
#[derive(Debug)]
pub struct IgnoreListStore {
    store: JsonStore<Vec<String>>,
}

impl IgnoreListStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::load(path.as_ref().to_path_buf())?,
        })
    }

    pub fn reload(&mut self) -> Result<()> {
        self.store.reload()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.store.doc().iter().any(|entry| entry == word)
    }

    pub fn add(&mut self, word: &str) -> Result<()> {
        if self.contains(word) {
            return Ok(());
        }
        self.store.doc_mut().push(word.to_string());
        self.store.write()
    }

    pub fn words(&self) -> &[String] {
        self.store.doc()
    }
}
