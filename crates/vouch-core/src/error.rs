use thiserror::Error;

/// Protocol-wide error types for the Vouch network.
#[derive(Debug, Error)]
pub enum VouchError {
    /// Storage layer error (DHT record store).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network error (peer transport, bootstrap, query routing).
    #[error("Network error: {0}")]
    Network(String),

    /// Cryptographic error (key generation, signing, verification).
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// A signature names an algorithm this node does not implement.
    /// Fatal configuration problem, never a validation `false`.
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Stored data we relied on is broken (unknown voter, assertion-less
    /// vote). Aborts the enclosing computation.
    #[error("Data integrity error: {0}")]
    Integrity(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Bad argument caught before any network operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<serde_json::Error> for VouchError {
    fn from(e: serde_json::Error) -> Self {
        VouchError::Serialization(e.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for VouchError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        VouchError::Crypto(e.to_string())
    }
}
