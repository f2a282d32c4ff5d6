use core_catalog::CatalogError;
use thiserror::Error;

/// Errors produced by the favorites ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FavoritesError {
    #[error("Sign in required")]
    SignInRequired,

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl From<CatalogError> for FavoritesError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Network(message) | CatalogError::MalformedPayload(message) => {
                FavoritesError::Network(message)
            }
            CatalogError::Validation { field, message } => {
                FavoritesError::Validation(format!("{}: {}", field, message))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FavoritesError>;
