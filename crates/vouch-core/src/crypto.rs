// crates/vouch-core/src/crypto.rs

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::VouchError;
use crate::types::{
    ContentHash, HashAlgorithm, Key, KeyPair, KeyType, Signature, SignatureAlgorithm,
};

/// Compute the SHA-256 content hash of the given bytes.
pub fn hash_of(data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentHash {
        algorithm: HashAlgorithm::Sha256,
        digest: hasher.finalize().to_vec(),
    }
}

/// Build a typed [`Key`] from raw bytes; the hash is always derived from
/// the raw material, never caller-supplied.
pub fn key_from_raw(key_type: KeyType, raw: Vec<u8>) -> Key {
    let hash = hash_of(&raw);
    Key {
        key_type,
        raw,
        hash,
    }
}

/// Generate a new random ed25519 key pair.
pub fn generate_key_pair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        public_key: key_from_raw(KeyType::Public, verifying_key.to_bytes().to_vec()),
        private_key: key_from_raw(KeyType::Private, signing_key.to_bytes().to_vec()),
    }
}

/// Rebuild a key pair from a 32-byte ed25519 signing seed.
pub fn key_pair_from_seed(seed: &[u8]) -> Result<KeyPair, VouchError> {
    let seed: [u8; 32] = seed
        .try_into()
        .map_err(|_| VouchError::Crypto("Private key seed must be exactly 32 bytes".to_string()))?;
    let signing_key = SigningKey::from_bytes(&seed);
    let verifying_key = signing_key.verifying_key();
    Ok(KeyPair {
        public_key: key_from_raw(KeyType::Public, verifying_key.to_bytes().to_vec()),
        private_key: key_from_raw(KeyType::Private, seed.to_vec()),
    })
}

/// Sign a message with the pair's private key.
///
/// Pure function, no storage. The produced [`Signature`] embeds the pair's
/// public key so verifiers can check the claimed signer.
pub fn sign_message(key_pair: &KeyPair, message: &[u8]) -> Result<Signature, VouchError> {
    let seed: [u8; 32] = key_pair
        .private_key
        .raw
        .as_slice()
        .try_into()
        .map_err(|_| VouchError::Crypto("Private key must be exactly 32 bytes".to_string()))?;
    let signing_key = SigningKey::from_bytes(&seed);
    let signature = signing_key.sign(message);
    Ok(Signature {
        algorithm: SignatureAlgorithm::Ed25519,
        public_key: key_pair.public_key.clone(),
        bytes: signature.to_bytes().to_vec(),
    })
}

/// Verify a signature over a message using the signature's embedded public
/// key. Returns `Ok(false)` on a bad signature, `Err` only on malformed
/// key or signature material.
pub fn verify_signature(signature: &Signature, message: &[u8]) -> Result<bool, VouchError> {
    let public_bytes: [u8; 32] = signature
        .public_key
        .raw
        .as_slice()
        .try_into()
        .map_err(|_| VouchError::Crypto("Public key must be exactly 32 bytes".to_string()))?;
    let verifying_key = VerifyingKey::from_bytes(&public_bytes)
        .map_err(|e| VouchError::Crypto(format!("Invalid public key: {}", e)))?;

    let signature_array: [u8; 64] = signature
        .bytes
        .as_slice()
        .try_into()
        .map_err(|_| VouchError::Crypto("Signature must be exactly 64 bytes".to_string()))?;
    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let pair = generate_key_pair();
        let message = b"vouch reputation network";

        let signature = sign_message(&pair, message).unwrap();
        assert!(verify_signature(&signature, message).unwrap());

        let tampered = verify_signature(&signature, b"tampered").unwrap();
        assert!(!tampered);
    }

    #[test]
    fn key_hash_derived_from_raw() {
        let pair = generate_key_pair();
        assert_eq!(pair.public_key.hash, hash_of(&pair.public_key.raw));
        assert_eq!(pair.public_key.key_type, KeyType::Public);
        assert_eq!(pair.private_key.key_type, KeyType::Private);
    }

    #[test]
    fn seed_round_trip_preserves_public_key() {
        let pair = generate_key_pair();
        let rebuilt = key_pair_from_seed(&pair.private_key.raw).unwrap();
        assert_eq!(pair.public_key, rebuilt.public_key);
    }

    #[test]
    fn hash_of_is_deterministic() {
        let a = hash_of(b"object");
        let b = hash_of(b"object");
        assert_eq!(a, b);
        assert_eq!(a.digest.len(), 32);
        assert_ne!(a, hash_of(b"other object"));
    }
}
