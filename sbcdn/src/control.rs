//! Fichier de contrôle des versions d'assets
//!
//! Le fichier de contrôle est un document YAML associant chaque identité
//! d'asset (`{nom}{extension}`) à son dernier condensat connu et à son
//! compteur de build. Toute modification passe par une transaction
//! fichier-entier sous verrou : lecture, mutation, réécriture en une
//! unité, pour qu'aucun compteur ne se perde quand plusieurs assets sont
//! traités dans le même build.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Enregistrement persisté d'un asset
///
/// Le compteur de build part de 0 (aucune version émise) et n'est
/// incrémenté que lorsque le contenu change ; il ne décroît jamais.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Condensat MD5 hexadécimal du dernier contenu versionné
    #[serde(default)]
    pub md5sum: Option<String>,
    /// Compteur de build embarqué dans le nom de fichier public
    #[serde(default)]
    pub build_no: u64,
}

/// Accès transactionnel au fichier de contrôle
///
/// Toutes les instances configurées sur le même chemin doivent partager le
/// même fichier physique ; le verrou interne sérialise les transactions au
/// sein du processus.
pub struct ControlFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ControlFile {
    /// Prépare le fichier de contrôle au chemin donné
    ///
    /// Le répertoire parent est créé s'il n'existe pas ; le fichier
    /// lui-même n'est créé qu'à la première écriture.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Retourne le chemin du fichier de contrôle
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exécute une transaction sur la table des enregistrements
    ///
    /// Charge la table, applique la fermeture, puis réécrit le fichier en
    /// entier. La fermeture reçoit la table mutable et retourne la valeur
    /// de la transaction. Si elle échoue, rien n'est réécrit.
    pub fn with_records<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, AssetRecord>) -> Result<R>,
    ) -> Result<R> {
        let _guard = self.lock.lock().unwrap();

        let mut records = self.load()?;
        let result = f(&mut records)?;
        self.save(&records)?;

        Ok(result)
    }

    fn load(&self) -> Result<BTreeMap<String, AssetRecord>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_yaml::from_str(&contents)?)
    }

    fn save(&self, records: &BTreeMap<String, AssetRecord>) -> Result<()> {
        let yaml = serde_yaml::to_string(records)?;
        std::fs::write(&self.path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let control = ControlFile::new(dir.path().join("cdn.yml")).unwrap();

        control
            .with_records(|records| {
                let record = records.entry("app.js".to_string()).or_default();
                record.build_no = 3;
                record.md5sum = Some("abc123".to_string());
                Ok(())
            })
            .unwrap();

        control
            .with_records(|records| {
                let record = records.get("app.js").unwrap();
                assert_eq!(record.build_no, 3);
                assert_eq!(record.md5sum.as_deref(), Some("abc123"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_missing_file_is_an_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let control = ControlFile::new(dir.path().join("cdn.yml")).unwrap();

        control
            .with_records(|records| {
                assert!(records.is_empty());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_record_without_md5sum_deserializes() {
        // Un enregistrement fraîchement initialisé n'a pas encore de condensat
        let record: AssetRecord = serde_yaml::from_str("build_no: 0\n").unwrap();
        assert_eq!(record.build_no, 0);
        assert_eq!(record.md5sum, None);
    }
}
