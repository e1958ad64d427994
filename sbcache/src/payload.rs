//! Capture sérialisable d'une réponse HTTP
//!
//! Les extensions qui interrogent les APIs externes (vidéos, livres,
//! feuilles de calcul) mémorisent la réponse brute plutôt que le client
//! HTTP lui-même. `HttpPayload` capture le statut, les en-têtes et le corps
//! d'une réponse sous une forme sérialisable en JSON.

use crate::store::CacheValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Réponse HTTP capturée, stockable dans le cache
///
/// Les noms d'en-têtes sont normalisés en minuscules à la construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpPayload {
    /// Code de statut HTTP
    pub status: u16,
    /// En-têtes de la réponse (noms en minuscules)
    pub headers: BTreeMap<String, String>,
    /// Corps de la réponse
    pub body: String,
}

impl HttpPayload {
    /// Construit un payload à partir de ses composants
    ///
    /// # Arguments
    ///
    /// * `status` - Code de statut HTTP
    /// * `headers` - En-têtes (les noms sont normalisés en minuscules)
    /// * `body` - Corps de la réponse
    pub fn new(
        status: u16,
        headers: impl IntoIterator<Item = (String, String)>,
        body: impl Into<String>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Capture une réponse du client HTTP bloquant
    ///
    /// Consomme la réponse : le corps est lu entièrement en mémoire.
    /// Les valeurs d'en-têtes non UTF-8 sont ignorées.
    pub fn from_response(response: reqwest::blocking::Response) -> anyhow::Result<Self> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect::<Vec<_>>();
        let body = response.text()?;

        Ok(Self::new(status, headers, body))
    }

    /// Indique si la réponse est un succès (statut 2xx)
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Retourne la valeur d'un en-tête (nom insensible à la casse)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Dérive une durée de vie de l'en-tête `Expires`
    ///
    /// Retourne `None` si l'en-tête est absent, illisible, ou déjà expiré.
    pub fn expires_ttl(&self) -> Option<Duration> {
        let expires = self.header("expires")?;
        let expires: DateTime<Utc> = DateTime::parse_from_rfc2822(expires).ok()?.into();
        let remaining = expires - Utc::now();
        remaining.to_std().ok().filter(|d| !d.is_zero())
    }
}

impl CacheValue for HttpPayload {
    fn cacheable(&self) -> bool {
        self.success()
    }

    fn ttl_hint(&self) -> Option<Duration> {
        self.expires_ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_header_names_are_lowercased() {
        let payload = HttpPayload::new(
            200,
            vec![("Content-Type".to_string(), "text/html".to_string())],
            "ok",
        );

        assert_eq!(payload.header("content-type"), Some("text/html"));
        assert_eq!(payload.header("Content-Type"), Some("text/html"));
        assert_eq!(payload.header("expires"), None);
    }

    #[test]
    fn test_success_statuses() {
        assert!(HttpPayload::new(200, vec![], "").success());
        assert!(HttpPayload::new(204, vec![], "").success());
        assert!(!HttpPayload::new(304, vec![], "").success());
        assert!(!HttpPayload::new(404, vec![], "").success());
        assert!(!HttpPayload::new(500, vec![], "").success());
    }

    #[test]
    fn test_cacheable_follows_status() {
        assert!(HttpPayload::new(200, vec![], "ok").cacheable());
        assert!(!HttpPayload::new(503, vec![], "unavailable").cacheable());
    }

    #[test]
    fn test_expires_ttl_in_the_future() {
        let expires = (Utc::now() + ChronoDuration::hours(1)).to_rfc2822();
        let payload = HttpPayload::new(200, vec![("Expires".to_string(), expires)], "");

        let ttl = payload.expires_ttl().unwrap();
        assert!(ttl.as_secs() > 3500 && ttl.as_secs() <= 3600);
    }

    #[test]
    fn test_expires_ttl_in_the_past() {
        let expires = (Utc::now() - ChronoDuration::hours(1)).to_rfc2822();
        let payload = HttpPayload::new(200, vec![("Expires".to_string(), expires)], "");

        assert_eq!(payload.expires_ttl(), None);
    }

    #[test]
    fn test_json_round_trip() {
        let payload = HttpPayload::new(
            200,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            r#"{"title":"Getting Started"}"#,
        );

        let serialized = serde_json::to_string(&payload).unwrap();
        let deserialized: HttpPayload = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, payload);
    }
}
