//! # sbcache - Cache clé/valeur pour le pipeline SiteBuild
//!
//! Cette crate fournit le cache qui mémorise, d'un build à l'autre, les
//! résultats des appels coûteux aux APIs externes (métadonnées de vidéos,
//! de livres, de feuilles de calcul...). Elle est utilisée par les
//! extensions du pipeline via une interface unique à trois opérations :
//! `read`, `write` et `fetch`.
//!
//! ## Vue d'ensemble
//!
//! `sbcache` combine :
//! - Une couche mémoire valable pour la durée du processus (y compris la
//!   mémorisation des absences, pour ne pas réinterroger un service
//!   distant qui a déjà répondu « pas trouvé »)
//! - Un magasin persistant unique, choisi à la construction parmi trois
//!   backends
//!
//! ## Architecture
//!
//! ```text
//! sbcache
//!     ├── store.rs       - Trait CacheStore + trait CacheValue
//!     ├── cache.rs       - Façade Cache (mémo + magasin persistant)
//!     ├── file_store.rs  - Backend fichier YAML (développement)
//!     ├── db.rs          - Backend SQLite embarqué
//!     ├── remote.rs      - Backend service HTTP distant (production)
//!     └── payload.rs     - HttpPayload, réponse HTTP capturée
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use sbcache::Cache;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cache: Cache<f64> = Cache::file("_tmp/cache.store")?;
//!
//!     cache.write("pi", 3.14)?;
//!     assert_eq!(cache.read("pi")?, Some(3.14));
//!
//!     // Le fournisseur n'est pas invoqué : la clé est déjà en cache
//!     let value = cache.fetch("pi", || Ok(2.71))?;
//!     assert_eq!(value, 3.14);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Sémantique des échecs
//!
//! - L'absence d'une clé est un résultat (`Ok(None)`), jamais une erreur.
//! - Un service distant injoignable ou répondant non 2xx est journalisé et
//!   traité comme un défaut de cache : le build continue.
//! - Une erreur d'E/S locale (répertoire impossible à créer, fichier
//!   illisible) remonte à l'appelant : sans stockage durable le cache ne
//!   peut pas tenir son contrat.
//! - Une valeur représentant une réponse HTTP en échec n'est jamais
//!   persistée (voir [`CacheValue::cacheable`]).
//!
//! ## Dépendances principales
//!
//! - `rusqlite` : backend SQLite embarqué
//! - `reqwest` (bloquant) : backend distant
//! - `sha1` : normalisation des clés distantes
//! - `serde_json` / `serde_yaml` : sérialisation des valeurs

pub mod cache;
pub mod db;
pub mod file_store;
pub mod payload;
pub mod remote;
pub mod store;

#[cfg(feature = "sbconfig")]
pub mod config_ext;

pub use cache::Cache;
pub use db::DbStore;
pub use file_store::{FileStore, DEFAULT_STORE_FILE};
pub use payload::HttpPayload;
pub use remote::RemoteStore;
pub use store::{CacheStore, CacheValue, WriteOptions};

#[cfg(feature = "sbconfig")]
pub use config_ext::CacheConfigExt;
