//! Façade du cache clé/valeur
//!
//! Ce module fournit l'interface unique que le code appelant utilise pour
//! mémoriser les résultats de calculs coûteux (typiquement des appels aux
//! APIs externes). La façade combine une couche mémoire valable pour la
//! durée du processus et exactement un magasin persistant, choisi à la
//! construction.

use crate::file_store::FileStore;
use crate::remote::RemoteStore;
use crate::store::{CacheStore, CacheValue, WriteOptions};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Cache clé/valeur à mémo en mémoire et magasin persistant unique
///
/// La couche mémoire retient le résultat de chaque recherche, y compris
/// les absences : une clé connue comme absente du magasin distant n'est
/// pas redemandée au service pendant le même build. La distinction entre
/// « jamais cherché » et « cherché, absent » est portée par le `Option`
/// stocké dans la table.
///
/// # Paramètres de type
///
/// * `V` - Type des valeurs mises en cache (implémente [`CacheValue`])
///
/// Note : la couche mémoire appartient exclusivement à son instance. Un
/// même cache peut être partagé entre les threads d'un processus, jamais
/// entre processus ; c'est le magasin persistant qui survit au build.
pub struct Cache<V: CacheValue> {
    /// Couche mémoire : clé -> résultat connu (valeur ou absence)
    memory: Mutex<HashMap<String, Option<V>>>,
    /// Magasin persistant
    store: Box<dyn CacheStore<V>>,
}

impl<V: CacheValue> Cache<V> {
    /// Crée un cache sur un magasin arbitraire
    pub fn with_store(store: Box<dyn CacheStore<V>>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            store,
        }
    }

    /// Crée un cache adossé à un fichier YAML local
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin du fichier de stockage
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_store(Box::new(FileStore::new(
            path.as_ref().to_path_buf(),
        )?)))
    }

    /// Crée un cache adossé à une base SQLite locale
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin du fichier de base de données
    /// * `table` - Nom de la table à utiliser
    pub fn database(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        Ok(Self::with_store(Box::new(crate::db::DbStore::open(
            path.as_ref(),
            table,
        )?)))
    }

    /// Crée un cache adossé au service distant
    pub fn remote(store: RemoteStore) -> Self {
        Self::with_store(Box::new(store))
    }

    /// Recherche une valeur par sa clé
    ///
    /// Consulte d'abord la couche mémoire ; en cas de défaut, interroge le
    /// magasin persistant et retient le résultat (valeur ou absence) pour
    /// les recherches suivantes. L'absence est un résultat normal,
    /// représentée par `Ok(None)`.
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// # use sbcache::Cache;
    /// # let cache: Cache<f64> = Cache::file("_tmp/cache.store").unwrap();
    /// if let Some(value) = cache.read("pi").unwrap() {
    ///     println!("cached: {}", value);
    /// }
    /// ```
    pub fn read(&self, key: &str) -> Result<Option<V>> {
        {
            let memory = self.memory.lock().unwrap();
            if let Some(known) = memory.get(key) {
                return Ok(known.clone());
            }
        }

        let found = self.store.read(key)?;

        let mut memory = self.memory.lock().unwrap();
        memory.insert(key.to_string(), found.clone());
        Ok(found)
    }

    /// Ajoute une valeur au cache
    ///
    /// Équivalent à [`Cache::write_with`] avec les options par défaut.
    /// Retourne la valeur écrite, pour chaînage.
    pub fn write(&self, key: &str, value: V) -> Result<V> {
        self.write_with(key, value, &WriteOptions::default())
    }

    /// Ajoute une valeur au cache avec des options de persistance
    ///
    /// Une valeur non cachable (réponse HTTP en échec) n'est pas écrite :
    /// l'état antérieur du cache pour cette clé, s'il existe, reste
    /// intact, et la valeur est tout de même retournée à l'appelant.
    ///
    /// # Arguments
    ///
    /// * `key` - Clé de l'entrée
    /// * `value` - Valeur à persister
    /// * `opts` - Options de persistance (TTL, type de contenu)
    pub fn write_with(&self, key: &str, value: V, opts: &WriteOptions) -> Result<V> {
        // On ne met jamais les échecs en cache
        if !value.cacheable() {
            tracing::debug!("Skipping cache write for key '{}': value not cacheable", key);
            return Ok(value);
        }

        self.store.write(key, &value, opts)?;
        self.memory
            .lock()
            .unwrap()
            .insert(key.to_string(), Some(value.clone()));

        Ok(value)
    }

    /// Récupère la valeur du cache, ou le résultat du fournisseur
    ///
    /// Le fournisseur n'est invoqué qu'en cas de défaut de cache, au plus
    /// une fois par appel ; son résultat est alors écrit puis retourné.
    /// C'est le point d'entrée principal pour mémoriser un calcul coûteux.
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// # use sbcache::Cache;
    /// # let cache: Cache<String> = Cache::file("_tmp/cache.store").unwrap();
    /// let body = cache.fetch("videos:abc123", || {
    ///     // appel réseau coûteux
    ///     Ok("response body".to_string())
    /// }).unwrap();
    /// ```
    pub fn fetch(&self, key: &str, supplier: impl FnOnce() -> Result<V>) -> Result<V> {
        if let Some(value) = self.read(key)? {
            return Ok(value);
        }

        let value = supplier()?;
        self.write(key, value)
    }
}
