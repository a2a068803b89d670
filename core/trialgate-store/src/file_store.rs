//! JSON-file store.
//!
//! Each namespace maps to a directory under the store root; its values live in
//! a single `values.json` object of string pairs. Namespaces may be nested with
//! `/` (e.g. `YourCompany/DemoApp`).

use crate::error::{StoreError, StoreResult};
use crate::PersistentStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

const VALUES_FILE: &str = "values.json";

/// A [`PersistentStore`] that keeps one JSON file per namespace.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens a store rooted at `root`. The directory is created lazily on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Opens a store rooted at the platform configuration directory
    /// (`~/.config` on Linux, `~/Library/Application Support` on macOS,
    /// `%APPDATA%` on Windows).
    pub fn open_default() -> StoreResult<Self> {
        let root = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(root))
    }

    /// Returns the store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the values file for `namespace`.
    pub fn values_path(&self, namespace: &str) -> StoreResult<PathBuf> {
        let mut path = self.root.clone();
        let mut components = 0;
        for part in namespace.split(['/', '\\']) {
            // A drive or path prefix (`C:`) would replace the root on push.
            if part.is_empty() || part == "." || part == ".." || part.contains(':') {
                return Err(StoreError::InvalidNamespace(namespace.to_string()));
            }
            path.push(part);
            components += 1;
        }
        if components == 0 || !path.starts_with(&self.root) {
            return Err(StoreError::InvalidNamespace(namespace.to_string()));
        }
        path.push(VALUES_FILE);
        Ok(path)
    }

    fn load(path: &Path) -> StoreResult<BTreeMap<String, String>> {
        match fs::read(path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(path: &Path, values: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl PersistentStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        let path = self.values_path(namespace)?;
        let mut values = Self::load(&path)?;
        Ok(values.remove(key))
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        let path = self.values_path(namespace)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = Self::load(&path)?;
        values.insert(key.to_string(), value.to_string());
        Self::save(&path, &values)?;
        debug!("Stored {} in {}", key, path.display());
        Ok(())
    }
}
