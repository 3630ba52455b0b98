// crates/vouch-core/src/user.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Key, Signature};

/// A trust claim one identity makes about another identity's public key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trust {
    Trusted,
    NotTrusted,
}

/// One entry in a user's published trust list.
///
/// References a public key, not a resolved identity; resolution happens at
/// read time and may fail, in which case the entry is dropped from any
/// trust-network computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustAssertion {
    pub public_key: Key,
    pub trust: Trust,
}

/// One identity's public profile: a display handle, the identity's public
/// key, and its ordered list of trust assertions about other keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub handle: String,
    pub public_key: Key,
    pub trusted: Vec<TrustAssertion>,
}

impl User {
    /// Build a profile with an empty trust list.
    pub fn new(handle: impl Into<String>, public_key: Key) -> Self {
        Self {
            handle: handle.into(),
            public_key,
            trusted: Vec::new(),
        }
    }

    /// Canonical signing digest for this profile.
    ///
    /// SHA-256 over handle, public key raw bytes, and each trust assertion
    /// in list order. Independent of the storage serialization.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.handle.as_bytes());
        hasher.update(&self.public_key.raw);
        for assertion in &self.trusted {
            hasher.update(&assertion.public_key.raw);
            hasher.update(match assertion.trust {
                Trust::Trusted => [1u8],
                Trust::NotTrusted => [0u8],
            });
        }
        hasher.finalize().to_vec()
    }
}

/// A [`User`] plus its owner's signature — the unit of identity storage.
///
/// Canonical only when self-signed: the signature's embedded public key
/// must equal `user.public_key` and verify over the profile's canonical
/// digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedUser {
    pub user: User,
    pub signature: Signature,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;

    #[test]
    fn signable_bytes_changes_with_trust_list() {
        let pair = crypto::generate_key_pair();
        let other = crypto::generate_key_pair();
        let mut user = User::new("alice", pair.public_key.clone());
        let before = user.signable_bytes();

        user.trusted.push(TrustAssertion {
            public_key: other.public_key.clone(),
            trust: Trust::Trusted,
        });
        let after = user.signable_bytes();
        assert_ne!(before, after);

        // Flipping the flag alone must also change the digest.
        user.trusted[0].trust = Trust::NotTrusted;
        assert_ne!(after, user.signable_bytes());
    }

    #[test]
    fn signable_bytes_stable_across_clones() {
        let pair = crypto::generate_key_pair();
        let user = User::new("bob", pair.public_key);
        assert_eq!(user.signable_bytes(), user.clone().signable_bytes());
    }
}
