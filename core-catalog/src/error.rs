use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors produced by the catalog boundary and cache.
///
/// All variants carry owned strings so the error is `Clone`: de-duplicated
/// concurrent fetches share a single in-flight future and every joined
/// caller receives the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid input: {field} - {message}")]
    Validation { field: String, message: String },
}

impl CatalogError {
    /// True for failures of the network/boundary class (transport errors and
    /// rejected payloads), as opposed to caller-input validation.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CatalogError::Network(_) | CatalogError::MalformedPayload(_)
        )
    }

    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<BridgeError> for CatalogError {
    fn from(err: BridgeError) -> Self {
        CatalogError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
