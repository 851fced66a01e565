// Signing Errors
//
// Failures raised while preparing a signed request. All of them are local
// and terminal for the request being built.

use thiserror::Error;

/// Errors produced by the request signer and identity loading.
#[derive(Debug, Error)]
pub enum SigningError {
    /// A required identity field is missing or empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The private key file is missing, unreadable or not a valid RSA key.
    #[error("failed to load signing key: {0}")]
    KeyLoad(String),

    /// The request body cannot be represented in canonical JSON form.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SigningError {
    fn from(err: serde_json::Error) -> Self {
        SigningError::Serialization(err.to_string())
    }
}
