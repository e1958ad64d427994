//! Error types for the asset versioner

/// Result type alias for versioner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while versioning assets
///
/// A versioning failure is fatal for the asset being processed: there is no
/// unversioned fallback filename.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (control file or asset file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Control file parsing or serialization failed
    #[error("Control file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
