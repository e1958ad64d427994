//! Contrat commun des magasins de cache
//!
//! Définit l'interface que tous les backends (fichier YAML, SQLite, service
//! HTTP distant) implémentent, ainsi que le trait `CacheValue` décrivant ce
//! qu'une valeur doit savoir faire pour être mise en cache.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Options de persistance passées à `write`
///
/// Seul le backend distant les interprète : les magasins locaux conservent
/// les valeurs sans durée de vie ni type de contenu.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Durée de vie de l'entrée côté service distant
    pub ttl: Option<Duration>,
    /// Type de contenu envoyé dans la requête PUT
    pub content_type: Option<String>,
}

/// Trait décrivant une valeur stockable dans le cache
///
/// Les deux méthodes à défaut permettent aux valeurs issues de requêtes HTTP
/// de refuser la mise en cache (réponse en échec) ou de proposer une durée
/// de vie dérivée de leur en-tête `Expires`.
pub trait CacheValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Indique si la valeur mérite d'être persistée
    ///
    /// Une valeur représentant un échec (réponse HTTP non 2xx) retourne
    /// `false` : l'écriture est alors ignorée et l'état précédent du cache
    /// reste intact.
    fn cacheable(&self) -> bool {
        true
    }

    /// Durée de vie suggérée par la valeur elle-même
    ///
    /// Utilisée par le backend distant à la place de la durée par défaut,
    /// typiquement dérivée d'un en-tête `Expires`.
    fn ttl_hint(&self) -> Option<Duration> {
        None
    }
}

/// Implémente `CacheValue` avec le comportement par défaut pour des types
/// de données simples
///
/// # Exemple
///
/// ```rust,ignore
/// use sbcache::impl_cache_value;
///
/// #[derive(Clone, serde::Serialize, serde::Deserialize)]
/// struct VideoMetadata { title: String }
///
/// impl_cache_value!(VideoMetadata);
/// ```
#[macro_export]
macro_rules! impl_cache_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::CacheValue for $ty {}
        )*
    };
}

impl CacheValue for serde_json::Value {}

impl_cache_value!(String, f64, i64, u64, bool);

/// Interface commune des backends de stockage
///
/// Chaque implémentation persiste des paires clé/valeur ; la couche mémoire
/// et la politique de mise en cache (valeurs non cachables, fetch) vivent
/// dans [`crate::Cache`], jamais dans les backends.
///
/// Une clé logique donnée doit toujours se normaliser vers la même clé
/// physique d'une exécution à l'autre, sinon le magasin ne sert à rien
/// entre deux builds.
pub trait CacheStore<V: CacheValue>: Send + Sync {
    /// Recherche une valeur persistée
    ///
    /// L'absence d'une clé n'est pas une erreur : elle est signalée par
    /// `Ok(None)`. Une donnée persistée corrompue, en revanche, remonte en
    /// erreur de désérialisation.
    fn read(&self, key: &str) -> Result<Option<V>>;

    /// Persiste une valeur
    ///
    /// # Arguments
    ///
    /// * `key` - Clé normalisée
    /// * `value` - Valeur à persister
    /// * `opts` - Options de persistance (TTL, type de contenu)
    fn write(&self, key: &str, value: &V, opts: &WriteOptions) -> Result<()>;
}
