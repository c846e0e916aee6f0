//! Load/save collaborator for the metadata file.
//!
//! Paths are the ones written in the settings file (e.g.
//! `/mock_metadata.csv`), always interpreted relative to a data root.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

/// Errors from loading or saving a file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path resolves to nothing usable
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// No file at the path
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// The backend refused the request
    #[error("Save rejected: {message}")]
    Rejected { message: String },
}

/// Where the metadata CSV is read from and written to.
pub trait Storage: Send + Sync {
    /// Read the whole file at `path`.
    fn load(&self, path: &str) -> Result<String, StorageError>;

    /// Replace the file at `path` with `content`.
    fn save(&self, path: &str, content: &str) -> Result<(), StorageError>;
}

/// Strip traversal and root components so `path` stays below a root.
///
/// `..` segments that would climb above the root are dropped.
pub fn sanitize_path(path: &str) -> Result<PathBuf, StorageError> {
    let mut clean = PathBuf::new();
    for component in Path::new(path.trim()).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::ParentDir => {
                clean.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(clean)
}

/// Files below a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a settings path.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(sanitize_path(path)?))
    }
}

impl Storage for FileStorage {
    fn load(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        match fs::read_to_string(&full) {
            Ok(text) => {
                log::debug!("Read {} bytes from {:?}", text.len(), full);
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, path: &str, content: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        log::debug!("Wrote {} bytes to {:?}", content.len(), full);
        Ok(())
    }
}

/// In-memory storage, with a switch to make saves fail.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, String>>,
    fail_saves: Mutex<bool>,
    save_count: Mutex<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage holding one file.
    pub fn with_file(path: &str, content: &str) -> Self {
        let storage = Self::new();
        storage.insert(path, content);
        storage
    }

    pub fn insert(&self, path: &str, content: &str) {
        lock(&self.files).insert(path.to_string(), content.to_string());
    }

    /// Current content of a file.
    pub fn get(&self, path: &str) -> Option<String> {
        lock(&self.files).get(path).cloned()
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        *lock(&self.fail_saves) = fail;
    }

    /// Number of save calls seen, failed ones included.
    pub fn save_count(&self) -> usize {
        *lock(&self.save_count)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, path: &str) -> Result<String, StorageError> {
        self.get(path).ok_or_else(|| StorageError::NotFound {
            path: path.to_string(),
        })
    }

    fn save(&self, path: &str, content: &str) -> Result<(), StorageError> {
        *lock(&self.save_count) += 1;
        if *lock(&self.fail_saves) {
            return Err(StorageError::Rejected {
                message: "storage unavailable".to_string(),
            });
        }
        self.insert(path, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_root_and_traversal() {
        assert_eq!(
            sanitize_path("/data/meta.csv").expect("path"),
            PathBuf::from("data/meta.csv")
        );
        assert_eq!(
            sanitize_path("../../etc/passwd").expect("path"),
            PathBuf::from("etc/passwd")
        );
        assert_eq!(
            sanitize_path("/a/../b/./c.csv").expect("path"),
            PathBuf::from("b/c.csv")
        );
        assert!(sanitize_path("/").is_err());
        assert!(sanitize_path("").is_err());
        assert!(sanitize_path("../..").is_err());
    }

    #[test]
    fn test_file_storage_roundtrip_creates_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());

        storage
            .save("/nested/deeper/meta.csv", "filename\na.png\n")
            .expect("save");
        assert!(dir.path().join("nested/deeper/meta.csv").exists());
        assert_eq!(
            storage.load("nested/deeper/meta.csv").expect("load"),
            "filename\na.png\n"
        );
    }

    #[test]
    fn test_file_storage_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.load("/nope.csv"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_storage_stays_under_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("public"));
        storage.save("../escape.csv", "x").expect("save");
        assert!(dir.path().join("public/escape.csv").exists());
        assert!(!dir.path().join("escape.csv").exists());
    }

    #[test]
    fn test_memory_storage_failure_switch() {
        let storage = MemoryStorage::with_file("/m.csv", "old");
        storage.set_fail_saves(true);
        assert!(storage.save("/m.csv", "new").is_err());
        assert_eq!(storage.get("/m.csv").as_deref(), Some("old"));
        storage.set_fail_saves(false);
        storage.save("/m.csv", "new").expect("save");
        assert_eq!(storage.load("/m.csv").expect("load"), "new");
        assert_eq!(storage.save_count(), 2);
    }
}
