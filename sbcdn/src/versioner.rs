//! Versionnement des assets statiques
//!
//! Décide, pour chaque asset émis par le build (JS, CSS, images, polices),
//! si son contenu a changé depuis la dernière version publiée. Un contenu
//! inchangé conserve son nom de fichier public ; un contenu modifié reçoit
//! un nouveau nom embarquant un compteur de build incrémenté. Les caches
//! HTTP en aval peuvent donc être agressifs : un nom de fichier donné ne
//! change jamais de contenu.

use crate::control::ControlFile;
use crate::error::Result;
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};

/// Répertoire de sortie par défaut des assets versionnés
pub const CDN_TMP_DIR: &str = "_tmp/cdn";

/// Chemin par défaut du fichier de contrôle
pub const CDN_CONTROL: &str = "_cdn/cdn.yml";

/// Versionneur d'assets adossé au fichier de contrôle
///
/// Toutes les instances configurées sur les mêmes chemins travaillent sur
/// les mêmes fichiers physiques ; la transaction fichier-entier du fichier
/// de contrôle est ce qui empêche deux assets traités en parallèle de se
/// corrompre mutuellement leurs compteurs.
pub struct Cdn {
    control: ControlFile,
    output_dir: PathBuf,
}

impl Cdn {
    /// Crée un versionneur avec les chemins par défaut
    ///
    /// # Arguments
    ///
    /// * `ctx_path` - Préfixe de contexte sous le répertoire de sortie
    ///   (peut être vide), typiquement fourni par l'environnement de build
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use sbcdn::Cdn;
    ///
    /// let cdn = Cdn::new("assets").unwrap();
    /// let name = cdn.version("app", ".js", b"console.log(1)").unwrap();
    /// assert_eq!(name, "app-1.js");
    /// ```
    pub fn new(ctx_path: &str) -> Result<Self> {
        Self::with_paths(CDN_CONTROL, Path::new(CDN_TMP_DIR).join(ctx_path))
    }

    /// Crée un versionneur avec des chemins explicites
    ///
    /// # Arguments
    ///
    /// * `control_path` - Chemin du fichier de contrôle YAML
    /// * `output_dir` - Répertoire où écrire les assets versionnés
    pub fn with_paths(
        control_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            control: ControlFile::new(control_path)?,
            output_dir,
        })
    }

    /// Retourne le répertoire de sortie des assets versionnés
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Retourne le chemin du fichier de contrôle
    pub fn control_path(&self) -> &Path {
        self.control.path()
    }

    /// Attribue un nom de fichier versionné au contenu d'un asset
    ///
    /// Si le condensat du contenu diffère du dernier enregistré (y compris
    /// pour un asset jamais vu), le compteur de build est incrémenté de 1,
    /// l'enregistrement est réécrit et le contenu est écrit dans
    /// `{name}-{compteur}{ext}` sous le répertoire de sortie. Sinon, rien
    /// n'est écrit et le nom précédemment attribué est retourné tel quel.
    ///
    /// # Arguments
    ///
    /// * `name` - Nom logique de l'asset (sans extension)
    /// * `ext` - Extension, point compris (ex: `".js"`)
    /// * `content` - Contenu complet de l'asset
    ///
    /// # Returns
    ///
    /// Le nom de fichier versionné, stable tant que le contenu ne change pas
    pub fn version(&self, name: &str, ext: &str, content: &[u8]) -> Result<String> {
        let id = format!("{}{}", name, ext);
        let md5sum = hex::encode(Md5::digest(content));

        self.control.with_records(|records| {
            let record = records.entry(id.clone()).or_default();

            if record.md5sum.as_deref() != Some(md5sum.as_str()) {
                record.build_no += 1;
                record.md5sum = Some(md5sum.clone());

                let filename = format!("{}-{}{}", name, record.build_no, ext);
                std::fs::write(self.output_dir.join(&filename), content)?;

                tracing::debug!(
                    "Asset {} changed, published as {} (build {})",
                    id,
                    filename,
                    record.build_no
                );
                Ok(filename)
            } else {
                Ok(format!("{}-{}{}", name, record.build_no, ext))
            }
        })
    }
}
