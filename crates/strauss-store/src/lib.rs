//! Artifact persistence for pipeline runs
//!
//! Implements the ArtifactStore trait two ways: a directory of pretty-printed
//! JSON files for real runs, and an in-memory map for tests. Keys are stage
//! names; the file store maps a key to `<key>.json` inside its directory.
//!
//! # Examples
//!
//! ```no_run
//! use strauss_store::JsonDirStore;
//!
//! let store = JsonDirStore::new("out").unwrap();
//! // Store is now ready for artifact reads and writes
//! ```

#![warn(missing_docs)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use strauss_domain::traits::ArtifactStore;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during artifact storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact contents could not be serialized or deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No artifact stored under the key
    #[error("Artifact not found: {0}")]
    MissingArtifact(String),
}

/// Directory-backed artifact store.
///
/// Each artifact lives in its own file, named `<key>.json`, pretty-printed
/// so runs can be inspected and diffed with ordinary tools. Writes replace
/// the whole file.
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl ArtifactStore for JsonDirStore {
    type Error = StoreError;

    fn exists(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self.artifact_path(key).is_file())
    }

    fn read(&self, key: &str) -> Result<Value, Self::Error> {
        let path = self.artifact_path(key);
        if !path.is_file() {
            return Err(StoreError::MissingArtifact(key.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&mut self, key: &str, value: &Value) -> Result<(), Self::Error> {
        let path = self.artifact_path(key);
        let mut rendered = serde_json::to_string_pretty(value)?;
        rendered.push('\n');
        fs::write(&path, rendered)?;
        debug!("Wrote artifact '{}' to {}", key, path.display());
        Ok(())
    }
}

/// In-memory artifact store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    artifacts: HashMap<String, Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts currently held.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the store holds no artifacts.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    type Error = StoreError;

    fn exists(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self.artifacts.contains_key(key))
    }

    fn read(&self, key: &str) -> Result<Value, Self::Error> {
        self.artifacts
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::MissingArtifact(key.to_string()))
    }

    fn write(&mut self, key: &str, value: &Value) -> Result<(), Self::Error> {
        self.artifacts.insert(key.to_string(), value.clone());
        Ok(())
    }
}
