// crates/vouch-core/src/vote.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{ContentHash, Key, Signature};

/// Rating value an assertion attaches to a content property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rating {
    Good,
    Bad,
}

/// A named content property plus the rating claimed for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assertion {
    pub content_property: String,
    pub rating: Rating,
}

impl Assertion {
    pub fn new(content_property: impl Into<String>, rating: Rating) -> Self {
        Self {
            content_property: content_property.into(),
            rating,
        }
    }
}

/// One identity's rating(s) on one content object.
///
/// A stored vote must carry at least one assertion; scoring treats an
/// assertion-less vote as a data-integrity failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub owner_public_key: Key,
    pub content_hash: ContentHash,
    pub assertions: Vec<Assertion>,
}

impl Vote {
    pub fn new(owner_public_key: Key, content_hash: ContentHash) -> Self {
        Self {
            owner_public_key,
            content_hash,
            assertions: Vec::new(),
        }
    }

    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Canonical signing digest: SHA-256 over owner key, content hash, and
    /// each assertion in list order.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(&self.owner_public_key.raw);
        hasher.update(&self.content_hash.digest);
        for assertion in &self.assertions {
            hasher.update(assertion.content_property.as_bytes());
            hasher.update(match assertion.rating {
                Rating::Good => [1u8],
                Rating::Bad => [0u8],
            });
        }
        hasher.finalize().to_vec()
    }
}

/// A [`Vote`] plus its owner's signature — the unit of vote storage.
/// Multiple signed votes may exist for the same content hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedVote {
    pub vote: Vote,
    pub signature: Signature,
}
