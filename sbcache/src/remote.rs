//! Backend HTTP distant
//!
//! Persiste les paires clé/valeur dans un service de cache distant exposant
//! une API REST de type grille de données (GET pour lire, PUT pour écrire).
//! Les clés sont hachées en SHA-1 et préfixées par le profil de build dans
//! le chemin de l'URL ; les valeurs circulent en JSON.
//!
//! Un échec HTTP ordinaire n'est jamais une erreur pour l'appelant : une
//! réponse non 2xx en lecture est un simple défaut de cache, et une
//! écriture ratée est journalisée puis ignorée. Un cache indisponible ne
//! doit pas faire échouer le build qui l'utilise.

use crate::store::{CacheStore, CacheValue, WriteOptions};
use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::time::Duration;

/// En-tête de durée de vie reconnu par le service distant
const TTL_HEADER: &str = "timeToLiveSeconds";

/// Type de contenu par défaut des écritures
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Magasin clé/valeur adossé à un service HTTP distant
///
/// Chaque opération est un aller-retour réseau bloquant sur le thread
/// appelant. Le service étant partagé entre machines de build, deux
/// processus écrivant la même clé se résolvent en dernier-écrivain-gagnant.
pub struct RemoteStore {
    client: reqwest::blocking::Client,
    base_url: String,
    namespace: String,
    profile: String,
    username: Option<String>,
    password: Option<String>,
    default_ttl: Duration,
}

impl RemoteStore {
    /// Construit un magasin distant
    ///
    /// # Arguments
    ///
    /// * `profile` - Profil de build, préfixé aux clés pour isoler les environnements
    /// * `base_url` - URL de base du service (sans le chemin `/rest/...`)
    /// * `namespace` - Espace de noms du cache côté service
    /// * `username` - Identifiant HTTP basic (optionnel)
    /// * `password` - Mot de passe HTTP basic (optionnel)
    /// * `default_ttl` - Durée de vie appliquée aux écritures sans TTL explicite
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use sbcache::RemoteStore;
    /// use std::time::Duration;
    ///
    /// let store = RemoteStore::new(
    ///     "production",
    ///     "https://cache.example.com",
    ///     "sitebuild",
    ///     Some("builder".to_string()),
    ///     Some("secret".to_string()),
    ///     Duration::from_secs(360),
    /// ).unwrap();
    /// ```
    pub fn new(
        profile: &str,
        base_url: &str,
        namespace: &str,
        username: Option<String>,
        password: Option<String>,
        default_ttl: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("Failed to build HTTP client for the remote cache")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            profile: profile.to_string(),
            username,
            password,
            default_ttl,
        })
    }

    /// Normalise une clé logique en clé physique (condensat SHA-1 en hexadécimal)
    ///
    /// Le hachage est déterministe : une même clé logique retombe sur la
    /// même entrée distante d'un build à l'autre.
    fn hashed_key(key: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Construit l'URL d'une entrée
    ///
    /// Format: `{base_url}/rest/{namespace}/{profile}_{sha1(key)}`
    fn url_for(&self, key: &str) -> String {
        format!(
            "{}/rest/{}/{}_{}",
            self.base_url,
            self.namespace,
            self.profile,
            Self::hashed_key(key)
        )
    }

    /// Applique l'authentification basic si des identifiants sont configurés
    fn authenticate(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }
}

impl<V: CacheValue> CacheStore<V> for RemoteStore {
    fn read(&self, key: &str) -> Result<Option<V>> {
        let url = self.url_for(key);

        let response = match self.authenticate(self.client.get(&url)).send() {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Remote cache unreachable for GET {}: {}", url, err);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            // Une clé absente du cache distant n'est pas une erreur
            tracing::debug!(
                "Remote cache miss for {} (status {})",
                url,
                response.status()
            );
            return Ok(None);
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Failed to read remote cache body for {}: {}", url, err);
                return Ok(None);
            }
        };

        let value = serde_json::from_str(&body)
            .with_context(|| format!("Corrupt remote cache entry for key '{}'", key))?;
        Ok(Some(value))
    }

    fn write(&self, key: &str, value: &V, opts: &WriteOptions) -> Result<()> {
        let url = self.url_for(key);
        let body = serde_json::to_string(value)?;

        let ttl = opts
            .ttl
            .or_else(|| value.ttl_hint())
            .unwrap_or(self.default_ttl);
        let content_type = opts.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        tracing::debug!("Writing to remote cache {} for key '{}'", url, key);

        let request = self
            .authenticate(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(TTL_HEADER, ttl.as_secs().to_string())
            .body(body);

        match request.send() {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(
                    "Remote cache rejected PUT {} (status {})",
                    url,
                    response.status()
                );
            }
            Err(err) => {
                tracing::warn!("Remote cache unreachable for PUT {}: {}", url, err);
            }
        }

        Ok(())
    }
}
