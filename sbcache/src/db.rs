//! Backend SQLite embarqué
//!
//! Persiste les paires clé/valeur dans une base SQLite locale. La connexion
//! est ouverte une fois à la construction et conservée pour la durée du
//! processus ; un Mutex interne sérialise les accès pour rester cohérent si
//! le magasin est partagé entre plusieurs threads de travail.

use crate::store::{CacheStore, CacheValue, WriteOptions};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Nom de table par défaut
pub const DEFAULT_TABLE: &str = "cache";

/// Magasin clé/valeur persisté dans une base SQLite
///
/// Les valeurs sont sérialisées en JSON dans une colonne texte, avec la
/// date d'écriture en RFC3339. Deux caches logiquement distincts peuvent
/// partager le même fichier de base en utilisant des tables différentes.
#[derive(Debug)]
pub struct DbStore {
    conn: Mutex<Connection>,
    table_name: String,
}

impl DbStore {
    /// Ouvre une base de données avec une table personnalisée
    ///
    /// La table et le fichier sont créés s'ils n'existent pas ; le
    /// répertoire parent doit exister.
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin vers le fichier de base de données SQLite
    /// * `table_name` - Nom de la table à utiliser
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use sbcache::DbStore;
    /// use std::path::Path;
    ///
    /// let store = DbStore::open(Path::new("cache.db"), "videos").unwrap();
    /// ```
    pub fn open(path: &Path, table_name: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create cache directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open cache database {}", path.display()))?;

        let create_table_sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at TEXT
            )",
            table_name
        );

        conn.execute(&create_table_sql, [])?;

        Ok(Self {
            conn: Mutex::new(conn),
            table_name: table_name.to_string(),
        })
    }

    /// Ouvre une base de données avec la table par défaut
    pub fn open_default(path: &Path) -> Result<Self> {
        Self::open(path, DEFAULT_TABLE)
    }

    /// Récupère la valeur JSON brute d'une clé
    pub fn get(&self, key: &str) -> rusqlite::Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT value FROM {} WHERE key = ?1", self.table_name);

        conn.query_row(&sql, [key], |row| row.get(0)).optional()
    }

    /// Ajoute ou remplace une entrée
    ///
    /// # Arguments
    ///
    /// * `key` - Clé de l'entrée
    /// * `value` - Valeur sérialisée en JSON
    pub fn put(&self, key: &str, value: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "INSERT INTO {} (key, value, stored_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 stored_at = excluded.stored_at",
            self.table_name
        );

        conn.execute(&sql, params![key, value, Utc::now().to_rfc3339()])?;

        Ok(())
    }

    /// Supprime une entrée
    pub fn delete(&self, key: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("DELETE FROM {} WHERE key = ?1", self.table_name);
        conn.execute(&sql, [key])?;
        Ok(())
    }

    /// Compte le nombre total d'entrées
    pub fn count(&self) -> rusqlite::Result<usize> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", self.table_name);
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Purge toutes les entrées de la table
    pub fn purge(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("DELETE FROM {}", self.table_name);
        conn.execute(&sql, [])?;
        Ok(())
    }
}

impl<V: CacheValue> CacheStore<V> for DbStore {
    fn read(&self, key: &str) -> Result<Option<V>> {
        match self.get(key)? {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt cache entry for key '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &V, _opts: &WriteOptions) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.put(key, &json)?;
        Ok(())
    }
}
