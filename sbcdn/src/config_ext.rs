//! Extension pour intégrer le versionneur dans sbconfig
//!
//! Ce module fournit le trait `CdnConfigExt` qui ajoute à
//! `sbconfig::Config` les méthodes de construction du versionneur d'assets.

use crate::versioner::{Cdn, CDN_CONTROL, CDN_TMP_DIR};
use anyhow::Result;
use sbconfig::Config;
use serde_yaml::Value;
use std::path::Path;

/// Trait d'extension pour ajouter le versionneur d'assets à sbconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use sbconfig::get_config;
/// use sbcdn::CdnConfigExt;
///
/// let config = get_config();
/// let cdn = config.create_cdn("assets")?;
/// ```
pub trait CdnConfigExt {
    /// Répertoire de sortie des assets versionnés
    ///
    /// Le répertoire est créé s'il n'existe pas.
    fn get_cdn_dir(&self) -> Result<String>;

    /// Chemin du fichier de contrôle des versions
    fn get_cdn_control_file(&self) -> Result<String>;

    /// Crée un versionneur configuré
    ///
    /// # Arguments
    ///
    /// * `ctx_path` - Préfixe de contexte sous le répertoire de sortie
    fn create_cdn(&self, ctx_path: &str) -> Result<Cdn>;
}

impl CdnConfigExt for Config {
    fn get_cdn_dir(&self) -> Result<String> {
        self.get_managed_dir(&["site", "cdn", "directory"], CDN_TMP_DIR)
    }

    fn get_cdn_control_file(&self) -> Result<String> {
        match self.get_value(&["site", "cdn", "control_file"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(CDN_CONTROL.to_string()),
        }
    }

    fn create_cdn(&self, ctx_path: &str) -> Result<Cdn> {
        let control = self.get_cdn_control_file()?;
        let output_dir = Path::new(&self.get_cdn_dir()?).join(ctx_path);
        Ok(Cdn::with_paths(control, output_dir)?)
    }
}
