//! # sbcdn - Versionnement d'assets pour le pipeline SiteBuild
//!
//! Cette crate attribue aux assets statiques du site (JS, CSS, images,
//! polices) des noms de fichiers publics versionnés par le contenu : tant
//! que le contenu d'un asset ne change pas, son nom reste stable et les
//! caches HTTP/CDN en aval restent chauds ; dès que le contenu change, un
//! nouveau nom est émis et les clients récupèrent la nouvelle version sans
//! invalidation manuelle.
//!
//! ## Fonctionnement
//!
//! Pour chaque asset, un enregistrement persisté conserve le condensat MD5
//! du dernier contenu publié et un compteur de build. L'opération
//! [`Cdn::version`] compare le contenu courant au condensat enregistré et
//! n'incrémente le compteur (et n'écrit le fichier) que sur changement.
//!
//! ```text
//! _cdn/cdn.yml          # fichier de contrôle: "{nom}{ext}" -> {md5sum, build_no}
//! _tmp/cdn/{ctx}/       # assets versionnés: app-1.js, app-2.js, logo-1.png...
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use sbcdn::Cdn;
//!
//! fn main() -> Result<(), sbcdn::Error> {
//!     let cdn = Cdn::new("assets")?;
//!
//!     let v1 = cdn.version("app", ".js", b"console.log(1)")?; // "app-1.js"
//!     let same = cdn.version("app", ".js", b"console.log(1)")?; // toujours "app-1.js"
//!     let v2 = cdn.version("app", ".js", b"console.log(2)")?; // "app-2.js"
//!     assert_eq!(v1, same);
//!     assert_ne!(v1, v2);
//!
//!     Ok(())
//! }
//! ```

pub mod control;
pub mod error;
pub mod versioner;

#[cfg(feature = "sbconfig")]
pub mod config_ext;

pub use control::{AssetRecord, ControlFile};
pub use error::{Error, Result};
pub use versioner::{Cdn, CDN_CONTROL, CDN_TMP_DIR};

#[cfg(feature = "sbconfig")]
pub use config_ext::CdnConfigExt;
