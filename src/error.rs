//! Error types for the locale pipeline and the domain models.

use thiserror::Error;

/// Failures of the locale resolver and cache builder.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// The language exists but is not one of the site's active languages.
    #[error("Invalid language ({0}).")]
    InvalidLanguage(String),

    /// The language code is not in the registry.
    #[error("Unknown language code: '{0}'")]
    UnknownLanguage(String),

    /// A strict lookup hit a missing translation.
    #[error("Missing translation {0}")]
    MissingTranslation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Failures of the domain models.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Location with id {0} doesn't exist")]
    LocationNotFound(i64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
