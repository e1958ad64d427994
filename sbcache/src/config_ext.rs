//! Extension pour intégrer le cache dans sbconfig
//!
//! Ce module fournit le trait `CacheConfigExt` qui ajoute à
//! `sbconfig::Config` les méthodes de construction du cache : chemins des
//! magasins locaux et fabrique du cache par défaut selon le profil de
//! build.

use crate::cache::Cache;
use crate::remote::RemoteStore;
use crate::store::CacheValue;
use anyhow::{anyhow, Result};
use sbconfig::{Config, Profile};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trait d'extension pour ajouter la gestion du cache à sbconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use sbconfig::get_config;
/// use sbcache::{CacheConfigExt, HttpPayload};
///
/// let config = get_config();
/// let cache = config.default_cache::<HttpPayload>()?;
/// ```
pub trait CacheConfigExt {
    /// Chemin du fichier de cache YAML du profil de développement
    ///
    /// Le répertoire de travail est créé s'il n'existe pas.
    fn get_cache_store_file(&self) -> Result<PathBuf>;

    /// Chemin du fichier de base SQLite
    fn get_cache_db_file(&self) -> Result<PathBuf>;

    /// Construit le magasin distant à partir de la configuration
    ///
    /// Échoue si aucune URL de service n'est configurée.
    fn remote_store(&self) -> Result<RemoteStore>;

    /// Construit le cache par défaut du profil courant
    ///
    /// Le profil de développement travaille sur le fichier local ; le
    /// profil de production passe par le service distant partagé.
    fn default_cache<V: CacheValue>(&self) -> Result<Cache<V>>;
}

impl CacheConfigExt for Config {
    fn get_cache_store_file(&self) -> Result<PathBuf> {
        let dir = self.get_managed_dir(&["site", "cache", "directory"], "_tmp")?;
        Ok(Path::new(&dir).join("cache.store"))
    }

    fn get_cache_db_file(&self) -> Result<PathBuf> {
        let dir = self.get_managed_dir(&["site", "cache", "directory"], "_tmp")?;
        Ok(Path::new(&dir).join("cache.db"))
    }

    fn remote_store(&self) -> Result<RemoteStore> {
        let url = self
            .get_cache_url()
            .ok_or_else(|| anyhow!("No remote cache url configured for the production profile"))?;
        let namespace = self.get_cache_namespace()?;
        let ttl = self.get_cache_default_ttl()?;

        RemoteStore::new(
            self.get_profile().as_str(),
            &url,
            &namespace,
            self.get_cache_username(),
            self.get_cache_password()?,
            Duration::from_secs(ttl as u64),
        )
    }

    fn default_cache<V: CacheValue>(&self) -> Result<Cache<V>> {
        match self.get_profile() {
            Profile::Development => Cache::file(self.get_cache_store_file()?),
            Profile::Production => Ok(Cache::remote(self.remote_store()?)),
        }
    }
}
