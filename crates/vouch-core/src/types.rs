// crates/vouch-core/src/types.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Digest algorithm tag carried by every [`ContentHash`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256, the network's canonical digest.
    Sha256,
}

/// An algorithm-tagged digest.
///
/// Used both for content addressing (votes are keyed by the hash of the
/// content object) and identity addressing (identities are keyed by the
/// hash of the owner's public key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContentHash {
    pub algorithm: HashAlgorithm,
    pub digest: Vec<u8>,
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short hex prefix, enough to eyeball identity in logs.
        let n = self.digest.len().min(8);
        write!(f, "{}…", hex::encode(&self.digest[..n]))
    }
}

/// Whether a [`Key`] carries public or private material.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KeyType {
    Public,
    Private,
}

/// A typed key: raw bytes plus the SHA-256 hash of those bytes.
///
/// The hash is the key's network address — identity records live at the
/// hash of the owner's public key. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Key {
    pub key_type: KeyType,
    pub raw: Vec<u8>,
    pub hash: ContentHash,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.key_type {
            KeyType::Public => "pub",
            KeyType::Private => "priv",
        };
        write!(f, "{}:{}", tag, self.hash)
    }
}

/// A private/public key pair. The private raw bytes are the 32-byte
/// ed25519 signing seed; the public raw bytes are the verifying key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: Key,
    pub private_key: Key,
}

/// Signature algorithm tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// ed25519, the implemented algorithm.
    Ed25519,
    /// Declared for forward compatibility; validation rejects it as a
    /// fatal configuration error.
    Secp256k1,
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::Ed25519 => write!(f, "ed25519"),
            SignatureAlgorithm::Secp256k1 => write!(f, "secp256k1"),
        }
    }
}

/// A detached signature: the signer's public key plus signature bytes over
/// the canonical encoding of the signed payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signature {
    pub algorithm: SignatureAlgorithm,
    pub public_key: Key,
    pub bytes: Vec<u8>,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig[{} by {}]", self.algorithm, self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_display_is_short_hex() {
        let hash = ContentHash {
            algorithm: HashAlgorithm::Sha256,
            digest: vec![0xab; 32],
        };
        let shown = format!("{}", hash);
        assert!(shown.starts_with("abababab"));
        assert!(shown.len() < 20);
    }
}
