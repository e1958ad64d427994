//! Backend fichier YAML
//!
//! Persiste les paires clé/valeur dans un unique fichier YAML sur le disque
//! local. Chaque opération recharge le fichier, le modifie et le réécrit en
//! entier sous un verrou : c'est suffisant pour un usage mono-machine en
//! développement, où le volume d'entrées reste faible.

use crate::store::{CacheStore, CacheValue, WriteOptions};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Chemin par défaut du fichier de cache, sous le répertoire de travail du build
pub const DEFAULT_STORE_FILE: &str = "_tmp/cache.store";

/// Magasin clé/valeur persisté dans un fichier YAML
///
/// Le répertoire parent du fichier est créé à la construction s'il est
/// absent. L'accès au fichier est sérialisé par un verrou interne ; une
/// même instance peut donc être partagée entre les threads d'un build,
/// mais pas entre plusieurs processus.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Ouvre (ou prépare) un magasin au chemin donné
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin du fichier YAML de stockage
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use sbcache::FileStore;
    ///
    /// let store = FileStore::new("_tmp/cache.store").unwrap();
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create cache directory {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Ouvre un magasin au chemin par défaut (`_tmp/cache.store`)
    pub fn with_default_path() -> Result<Self> {
        Self::new(DEFAULT_STORE_FILE)
    }

    /// Retourne le chemin du fichier de stockage
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Charge l'intégralité du fichier
    ///
    /// Un fichier absent ou vide équivaut à un magasin vide ; un fichier
    /// illisible remonte en erreur.
    fn load(&self) -> Result<BTreeMap<String, serde_yaml::Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache file {}", self.path.display()))?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Corrupt cache file {}", self.path.display()))
    }

    /// Réécrit l'intégralité du fichier
    fn save(&self, entries: &BTreeMap<String, serde_yaml::Value>) -> Result<()> {
        let yaml = serde_yaml::to_string(entries)?;
        std::fs::write(&self.path, yaml)
            .with_context(|| format!("Failed to write cache file {}", self.path.display()))?;
        Ok(())
    }
}

impl<V: CacheValue> CacheStore<V> for FileStore {
    fn read(&self, key: &str) -> Result<Option<V>> {
        let _guard = self.lock.lock().unwrap();

        let entries = self.load()?;
        match entries.get(key) {
            Some(value) => {
                let value = serde_yaml::from_value(value.clone())
                    .with_context(|| format!("Corrupt cache entry for key '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &V, _opts: &WriteOptions) -> Result<()> {
        let _guard = self.lock.lock().unwrap();

        let mut entries = self.load()?;
        entries.insert(key.to_string(), serde_yaml::to_value(value)?);
        self.save(&entries)
    }
}
