//! # Local Settings Store
//!
//! Device-local key-value persistence backed by a single YAML file. Budgets,
//! the theme flag and the active profile selection live here rather than in
//! the shared record store.
//!
//! The whole map is loaded on every read and the whole file rewritten on
//! every mutation, matching the replace-the-value semantics the domain layer
//! expects from this store.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::storage::traits::LocalStore;

const SETTINGS_FILE: &str = "settings.yaml";

/// File-backed key-value store holding serialized settings payloads
#[derive(Clone)]
pub struct YamlLocalStore {
    file_path: Arc<Mutex<PathBuf>>,
}

impl YamlLocalStore {
    /// Create a store writing to `settings.yaml` under the given directory
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let dir = directory.as_ref().to_path_buf();

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        Ok(Self {
            file_path: Arc::new(Mutex::new(dir.join(SETTINGS_FILE))),
        })
    }

    fn file_path(&self) -> PathBuf {
        let path = self.file_path.lock().unwrap();
        path.clone()
    }

    /// Load the whole settings map, treating a missing file as empty
    fn load_map(&self) -> Result<BTreeMap<String, String>> {
        let path = self.file_path();

        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&path)?;
        let map = serde_yaml::from_str(&content)?;
        debug!("Loaded settings from {:?}", path);
        Ok(map)
    }

    /// Rewrite the whole settings file through a temp file
    fn save_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let path = self.file_path();
        let content = serde_yaml::to_string(map)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[async_trait]
impl LocalStore for YamlLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.load_map()?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(key.to_string(), value.to_string());
        self.save_map(&map)?;

        info!("💾 Stored settings key '{}'", key);
        Ok(())
    }
}
